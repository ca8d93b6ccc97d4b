//! In-memory adapters used when no database URL is configured.
//!
//! A single [`InMemoryStore`] implements every repository port over one
//! shared state, so foreign-key and uniqueness rules hold across ports the
//! same way the PostgreSQL schema enforces them. Distances are computed per
//! row while the listing is evaluated.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::PageRequest;
use tokio::sync::RwLock;

use crate::domain::{PasswordHash, Ride, RideEvent, User};

mod rides;
mod users;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<i64, StoredUser>,
    tokens: HashMap<String, i64>,
    rides: BTreeMap<i64, Ride>,
    events: BTreeMap<i64, RideEvent>,
    last_user_id: i64,
    last_ride_id: i64,
    last_event_id: i64,
}

impl StoreState {
    fn user(&self, id: i64) -> Option<&User> {
        self.users.get(&id).map(|stored| &stored.user)
    }
}

/// Shared in-memory backing store for all repository ports.
///
/// Cloning is cheap; clones observe the same data.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store; `clock` stamps creation and modification times.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

/// Slice one page out of an ordered iterator.
fn page_of<T>(items: impl Iterator<Item = T>, page: &PageRequest) -> Vec<T> {
    items.skip(page.offset()).take(page.limit()).collect()
}

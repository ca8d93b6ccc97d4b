//! Port for ride event persistence.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{EventWindow, RideEvent, RideEventId, RideEventRecord, RideId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ride event repository adapters.
    pub enum RideEventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ride event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ride event repository query failed: {message}",
        /// The parent ride does not exist.
        MissingReference { field: String } => "{field} refers to an unknown ride",
    }
}

/// Port for ride events, including the bulk listing prefetch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideEventRepository: Send + Sync {
    /// Events of any of `rides` inside `window`, ascending by `created_at`,
    /// fetched with a single query.
    async fn events_for_rides(
        &self,
        rides: &[RideId],
        window: EventWindow,
    ) -> Result<Vec<RideEvent>, RideEventRepositoryError>;

    /// Insert an event.
    async fn create(
        &self,
        record: &RideEventRecord,
    ) -> Result<RideEvent, RideEventRepositoryError>;

    /// Fetch an event by id.
    async fn find_by_id(
        &self,
        id: RideEventId,
    ) -> Result<Option<RideEvent>, RideEventRepositoryError>;

    /// Replace an event's fields; `None` when the event does not exist.
    async fn update(
        &self,
        id: RideEventId,
        record: &RideEventRecord,
    ) -> Result<Option<RideEvent>, RideEventRepositoryError>;

    /// Delete an event; `false` when it did not exist.
    async fn delete(&self, id: RideEventId) -> Result<bool, RideEventRepositoryError>;

    /// Number of stored events.
    async fn count(&self) -> Result<usize, RideEventRepositoryError>;

    /// One page of events ordered by id.
    async fn list(&self, page: &PageRequest) -> Result<Vec<RideEvent>, RideEventRepositoryError>;
}

//! Builders wiring repository adapters into the services behind `HttpState`.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AuthTokenRepository, PasswordHasher, RideEventRepository, RideRepository, UserRepository,
};
use crate::domain::{
    AuthenticationService, RideEventService, RideQueryPipeline, RideService, UserService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselRideEventRepository, DieselRideRepository,
    DieselUserRepository,
};

/// Repository adapters for every driven port the services need.
pub struct Repositories<U, T, R, E> {
    pub users: Arc<U>,
    pub tokens: Arc<T>,
    pub rides: Arc<R>,
    pub events: Arc<E>,
}

impl Repositories<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore> {
    /// Back every port with one shared in-memory store.
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: Arc::clone(&store),
            tokens: Arc::clone(&store),
            rides: Arc::clone(&store),
            events: store,
        }
    }
}

impl
    Repositories<
        DieselUserRepository,
        DieselAuthTokenRepository,
        DieselRideRepository,
        DieselRideEventRepository,
    >
{
    /// PostgreSQL adapters sharing one connection pool and clock.
    pub fn diesel(pool: &DbPool, clock: &Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone(), Arc::clone(clock))),
            tokens: Arc::new(DieselAuthTokenRepository::new(pool.clone())),
            rides: Arc::new(DieselRideRepository::new(pool.clone(), Arc::clone(clock))),
            events: Arc::new(DieselRideEventRepository::new(
                pool.clone(),
                Arc::clone(clock),
            )),
        }
    }
}

/// Build the handler state: one service per aggregate, each exposed through
/// its query and command ports.
pub fn build_http_state<U, T, R, E, H>(
    repositories: Repositories<U, T, R, E>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    U: UserRepository + 'static,
    T: AuthTokenRepository + 'static,
    R: RideRepository + 'static,
    E: RideEventRepository + 'static,
    H: PasswordHasher + 'static,
{
    let Repositories {
        users,
        tokens,
        rides,
        events,
    } = repositories;

    let auth = Arc::new(AuthenticationService::new(
        Arc::clone(&users),
        tokens,
        Arc::clone(&hasher),
    ));
    let user_service = Arc::new(UserService::new(users, hasher));
    let ride_service = Arc::new(RideService::new(
        rides,
        Arc::clone(&events),
        RideQueryPipeline::new(Arc::clone(&clock)),
    ));
    let event_service = Arc::new(RideEventService::new(events, clock));

    HttpState {
        auth,
        users: user_service.clone(),
        users_command: user_service,
        rides: ride_service.clone(),
        rides_command: ride_service,
        ride_events: event_service.clone(),
        ride_events_command: event_service,
    }
}

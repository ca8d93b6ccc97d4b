//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) are implemented by
//! outbound adapters. Driving ports (`*Query`, `*Command`, [`AuthService`])
//! are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_service;
mod auth_token_repository;
mod password_hasher;
mod ride_event_repository;
mod ride_events_query;
mod ride_repository;
mod rides_query;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::{AuthService, LogoutOutcome};
#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
pub use auth_token_repository::{AuthTokenRepository, AuthTokenRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use ride_event_repository::MockRideEventRepository;
pub use ride_event_repository::{RideEventRepository, RideEventRepositoryError};
#[cfg(test)]
pub use ride_events_query::{MockRideEventsCommand, MockRideEventsQuery};
pub use ride_events_query::{RideEventsCommand, RideEventsQuery};
#[cfg(test)]
pub use ride_repository::MockRideRepository;
pub use ride_repository::{RideRepository, RideRepositoryError};
#[cfg(test)]
pub use rides_query::{MockRidesCommand, MockRidesQuery};
pub use rides_query::{RidesCommand, RidesQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::{MockUsersCommand, MockUsersQuery};
pub use users_query::{UsersCommand, UsersQuery};

#[cfg(test)]
mod tests;

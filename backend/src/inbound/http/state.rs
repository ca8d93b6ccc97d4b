//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised with in-memory adapters or mocks.

use std::sync::Arc;

use crate::domain::ports::{
    AuthService, RideEventsCommand, RideEventsQuery, RidesCommand, RidesQuery, UsersCommand,
    UsersQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-up, login and token resolution.
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    /// Ride reads, including the filtered listing.
    pub rides: Arc<dyn RidesQuery>,
    pub rides_command: Arc<dyn RidesCommand>,
    pub ride_events: Arc<dyn RideEventsQuery>,
    pub ride_events_command: Arc<dyn RideEventsCommand>,
}

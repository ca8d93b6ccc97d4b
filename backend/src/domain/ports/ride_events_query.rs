//! Driving ports for ride event management.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, Paged, RideEvent, RideEventDraft, RideEventId, RideEventPatch};

/// Use-case port for reading ride events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideEventsQuery: Send + Sync {
    /// One page of events ordered by id.
    async fn list_ride_events(&self, page: &PageRequest) -> Result<Paged<RideEvent>, Error>;

    /// A single event; `not_found` when the id is unknown.
    async fn get_ride_event(&self, id: RideEventId) -> Result<RideEvent, Error>;
}

/// Use-case port for changing ride events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideEventsCommand: Send + Sync {
    /// Record an event; a missing `created_at` means now.
    async fn create_ride_event(&self, draft: RideEventDraft) -> Result<RideEvent, Error>;

    /// Merge a partial update into a stored event.
    async fn update_ride_event(
        &self,
        id: RideEventId,
        patch: RideEventPatch,
    ) -> Result<RideEvent, Error>;

    /// Delete an event.
    async fn delete_ride_event(&self, id: RideEventId) -> Result<(), Error>;
}

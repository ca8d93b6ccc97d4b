//! Ride event management service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageRequest;

use crate::domain::ports::{RideEventRepository, RideEventsCommand, RideEventsQuery};
use crate::domain::ride_service::map_event_repository_error;
use crate::domain::{
    Error, Paged, RideEvent, RideEventDraft, RideEventId, RideEventPatch, RideEventRecord,
};

fn event_not_found(id: RideEventId) -> Error {
    Error::not_found(format!("ride event {id} not found"))
}

/// Ride event service implementing the ride event query and command ports.
#[derive(Clone)]
pub struct RideEventService<E> {
    events: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<E> RideEventService<E> {
    /// Create a service; `clock` stamps events created without a time.
    pub fn new(events: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }
}

#[async_trait]
impl<E> RideEventsQuery for RideEventService<E>
where
    E: RideEventRepository,
{
    async fn list_ride_events(&self, page: &PageRequest) -> Result<Paged<RideEvent>, Error> {
        let count = self
            .events
            .count()
            .await
            .map_err(map_event_repository_error)?;
        page.ensure_within(count)
            .map_err(|err| Error::not_found(err.to_string()))?;
        let items = self
            .events
            .list(page)
            .await
            .map_err(map_event_repository_error)?;
        Ok(Paged::new(count, items))
    }

    async fn get_ride_event(&self, id: RideEventId) -> Result<RideEvent, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(map_event_repository_error)?
            .ok_or_else(|| event_not_found(id))
    }
}

#[async_trait]
impl<E> RideEventsCommand for RideEventService<E>
where
    E: RideEventRepository,
{
    async fn create_ride_event(&self, draft: RideEventDraft) -> Result<RideEvent, Error> {
        let record = RideEventRecord {
            ride_id: draft.ride_id,
            description: draft.description,
            created_at: draft.created_at.unwrap_or_else(|| self.clock.utc()),
        };
        self.events
            .create(&record)
            .await
            .map_err(map_event_repository_error)
    }

    async fn update_ride_event(
        &self,
        id: RideEventId,
        patch: RideEventPatch,
    ) -> Result<RideEvent, Error> {
        let current = self.get_ride_event(id).await?;
        self.events
            .update(id, &patch.apply_to(&current))
            .await
            .map_err(map_event_repository_error)?
            .ok_or_else(|| event_not_found(id))
    }

    async fn delete_ride_event(&self, id: RideEventId) -> Result<(), Error> {
        let deleted = self
            .events
            .delete(id)
            .await
            .map_err(map_event_repository_error)?;
        if deleted {
            Ok(())
        } else {
            Err(event_not_found(id))
        }
    }
}

//! Ride services: the filtered ride listing and ride management.
//!
//! Listing runs the [`RideQueryPipeline`], counts and fetches one page of
//! joined rows, then issues a single bulk event query for the ids on that
//! page and distributes the events back to their rides.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageRequest;
use serde_json::json;

use crate::domain::ports::{
    RideEventRepository, RideEventRepositoryError, RideRepository, RideRepositoryError,
    RidesCommand, RidesQuery,
};
use crate::domain::{
    CoordinateError, Error, ListedRide, Paged, Ride, RideDraft, RideEvent, RideId, RideListParams,
    RideListRow, RidePatch, RideQuery, RideQueryPipeline,
};

pub(crate) fn map_ride_repository_error(error: RideRepositoryError) -> Error {
    match error {
        RideRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ride repository unavailable: {message}"))
        }
        RideRepositoryError::Query { message } => {
            Error::internal(format!("ride repository error: {message}"))
        }
        RideRepositoryError::MissingReference { field } => {
            let message = format!("{field} refers to an unknown user");
            Error::invalid_request(message)
                .with_details(json!({ "field": field, "code": "does_not_exist" }))
        }
    }
}

pub(crate) fn map_event_repository_error(error: RideEventRepositoryError) -> Error {
    match error {
        RideEventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ride event repository unavailable: {message}"))
        }
        RideEventRepositoryError::Query { message } => {
            Error::internal(format!("ride event repository error: {message}"))
        }
        RideEventRepositoryError::MissingReference { field } => {
            let message = format!("{field} refers to an unknown ride");
            Error::invalid_request(message)
                .with_details(json!({ "field": field, "code": "does_not_exist" }))
        }
    }
}

pub(crate) fn map_coordinate_error(error: CoordinateError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "code": "out_of_range" }))
}

fn ride_not_found(id: RideId) -> Error {
    Error::not_found(format!("ride {id} not found"))
}

/// Ride service implementing the ride query and command ports.
#[derive(Clone)]
pub struct RideService<R, E> {
    rides: Arc<R>,
    events: Arc<E>,
    pipeline: RideQueryPipeline,
}

impl<R, E> RideService<R, E> {
    /// Create a ride service over the ride and event repositories.
    pub fn new(rides: Arc<R>, events: Arc<E>, pipeline: RideQueryPipeline) -> Self {
        Self {
            rides,
            events,
            pipeline,
        }
    }
}

impl<R, E> RideService<R, E>
where
    R: RideRepository,
    E: RideEventRepository,
{
    /// Fetch the event window for every ride on the page in one query.
    async fn attach_events(
        &self,
        query: &RideQuery,
        rows: Vec<RideListRow>,
    ) -> Result<Vec<ListedRide>, Error> {
        let mut grouped: HashMap<RideId, Vec<RideEvent>> = HashMap::new();
        if let Some(window) = query.event_window().filter(|_| !rows.is_empty()) {
            let ids: Vec<RideId> = rows.iter().map(|row| row.ride.id).collect();
            let events = self
                .events
                .events_for_rides(&ids, window)
                .await
                .map_err(map_event_repository_error)?;
            for event in events {
                grouped.entry(event.ride_id).or_default().push(event);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let events = grouped.remove(&row.ride.id).unwrap_or_default();
                ListedRide::from_row(row, events)
            })
            .collect())
    }
}

#[async_trait]
impl<R, E> RidesQuery for RideService<R, E>
where
    R: RideRepository,
    E: RideEventRepository,
{
    fn plan_listing(&self, params: &RideListParams) -> Result<RideQuery, Error> {
        Ok(self.pipeline.build(params)?)
    }

    async fn list_rides(
        &self,
        query: &RideQuery,
        page: &PageRequest,
    ) -> Result<Paged<ListedRide>, Error> {
        let count = self
            .rides
            .count(query)
            .await
            .map_err(map_ride_repository_error)?;
        page.ensure_within(count)
            .map_err(|err| Error::not_found(err.to_string()))?;
        let rows = self
            .rides
            .execute(query, page)
            .await
            .map_err(map_ride_repository_error)?;
        let items = self.attach_events(query, rows).await?;
        Ok(Paged::new(count, items))
    }

    async fn get_ride(&self, id: RideId) -> Result<Ride, Error> {
        self.rides
            .find_by_id(id)
            .await
            .map_err(map_ride_repository_error)?
            .ok_or_else(|| ride_not_found(id))
    }
}

#[async_trait]
impl<R, E> RidesCommand for RideService<R, E>
where
    R: RideRepository,
    E: RideEventRepository,
{
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error> {
        self.rides
            .create(&draft)
            .await
            .map_err(map_ride_repository_error)
    }

    async fn update_ride(&self, id: RideId, patch: RidePatch) -> Result<Ride, Error> {
        let current = self.get_ride(id).await?;
        let draft = patch.apply_to(&current).map_err(map_coordinate_error)?;
        self.rides
            .update(id, &draft)
            .await
            .map_err(map_ride_repository_error)?
            .ok_or_else(|| ride_not_found(id))
    }

    async fn delete_ride(&self, id: RideId) -> Result<(), Error> {
        let deleted = self
            .rides
            .delete(id)
            .await
            .map_err(map_ride_repository_error)?;
        if deleted {
            Ok(())
        } else {
            Err(ride_not_found(id))
        }
    }
}

#[cfg(test)]
#[path = "ride_service_tests.rs"]
mod tests;

//! Driving ports for ride management and the ride listing.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Error, ListedRide, Paged, Ride, RideDraft, RideId, RideListParams, RidePatch, RideQuery,
};

/// Use-case port for reading rides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RidesQuery: Send + Sync {
    /// Validate listing parameters and compose the unexecuted query.
    ///
    /// Runs before the page is resolved so parameter errors take precedence
    /// over page errors.
    fn plan_listing(&self, params: &RideListParams) -> Result<RideQuery, Error>;

    /// Execute one page of a planned listing, attaching each listed ride's
    /// events from the trailing day.
    async fn list_rides(
        &self,
        query: &RideQuery,
        page: &PageRequest,
    ) -> Result<Paged<ListedRide>, Error>;

    /// A single ride; `not_found` when the id is unknown.
    async fn get_ride(&self, id: RideId) -> Result<Ride, Error>;
}

/// Use-case port for changing rides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RidesCommand: Send + Sync {
    /// Store a new ride.
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error>;

    /// Merge a partial update and re-check coordinates.
    async fn update_ride(&self, id: RideId, patch: RidePatch) -> Result<Ride, Error>;

    /// Delete a ride together with its events.
    async fn delete_ride(&self, id: RideId) -> Result<(), Error>;
}

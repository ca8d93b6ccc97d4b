//! Port for ride persistence and the ride listing query.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Ride, RideDraft, RideId, RideListRow, RideQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ride repository adapters.
    pub enum RideRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ride repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ride repository query failed: {message}",
        /// A referenced user does not exist.
        MissingReference { field: String } => "{field} refers to an unknown user",
    }
}

/// Port for storing rides and evaluating listing queries.
///
/// Listing adapters join rider and driver in the same statement and evaluate
/// the distance annotation inside the store. A query ordered by distance
/// without an annotation is rejected with [`RideRepositoryError::Query`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Number of rides matching the query's filters.
    async fn count(&self, query: &RideQuery) -> Result<usize, RideRepositoryError>;

    /// One page of joined rows matching the query.
    async fn execute(
        &self,
        query: &RideQuery,
        page: &PageRequest,
    ) -> Result<Vec<RideListRow>, RideRepositoryError>;

    /// Insert a ride.
    async fn create(&self, draft: &RideDraft) -> Result<Ride, RideRepositoryError>;

    /// Fetch a ride by id.
    async fn find_by_id(&self, id: RideId) -> Result<Option<Ride>, RideRepositoryError>;

    /// Replace a ride's fields; `None` when the ride does not exist.
    async fn update(
        &self,
        id: RideId,
        draft: &RideDraft,
    ) -> Result<Option<Ride>, RideRepositoryError>;

    /// Delete a ride and its events; `false` when it did not exist.
    async fn delete(&self, id: RideId) -> Result<bool, RideRepositoryError>;
}

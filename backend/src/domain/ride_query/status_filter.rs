//! Narrow a listing to one ride status.

use super::{RideListParams, RideQuery, RideQueryError, RideQueryStage, provided};
use crate::domain::RideStatus;

/// Applies the `status` parameter. Matching is case-sensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusFilter;

impl RideQueryStage for StatusFilter {
    fn apply(
        &self,
        query: RideQuery,
        params: &RideListParams,
    ) -> Result<RideQuery, RideQueryError> {
        let Some(raw) = provided(params.status.as_ref()) else {
            return Ok(query);
        };
        let status: RideStatus = raw.parse().map_err(|_| RideQueryError::UnknownStatus)?;
        Ok(query.with_status(status))
    }
}

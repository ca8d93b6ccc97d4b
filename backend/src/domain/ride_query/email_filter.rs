//! Narrow a listing to one rider by email.

use super::{RideListParams, RideQuery, RideQueryError, RideQueryStage, provided};

/// Applies the `email` parameter. The value is not format checked; stores
/// compare it case-insensitively.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmailFilter;

impl RideQueryStage for EmailFilter {
    fn apply(
        &self,
        query: RideQuery,
        params: &RideListParams,
    ) -> Result<RideQuery, RideQueryError> {
        Ok(match provided(params.email.as_ref()) {
            Some(email) => query.with_rider_email(email),
            None => query,
        })
    }
}

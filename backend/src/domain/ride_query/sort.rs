//! Resolve the listing order.

use super::{RideListParams, RideOrdering, RideQuery, RideQueryError, RideQueryStage, provided};

/// Applies `sort_by`, defaulting to pickup time.
///
/// Choosing `distance` does not annotate the query; the pipeline runs
/// [`super::DistanceAnnotator`] first when coordinates are supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SortResolver;

impl RideQueryStage for SortResolver {
    fn apply(
        &self,
        query: RideQuery,
        params: &RideListParams,
    ) -> Result<RideQuery, RideQueryError> {
        let ordering = match provided(params.sort_by.as_ref()) {
            None => RideOrdering::default(),
            Some(raw) => RideOrdering::ALL
                .into_iter()
                .find(|ordering| ordering.as_str() == raw)
                .ok_or(RideQueryError::UnknownSortKey)?,
        };
        Ok(query.order_by(ordering))
    }
}

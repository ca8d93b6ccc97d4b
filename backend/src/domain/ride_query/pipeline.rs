//! Compose the listing stages in their fixed order.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use super::{
    DistanceAnnotator, EmailFilter, EventWindowPrefetcher, RideListParams, RideQuery,
    RideQueryError, RideQueryStage, SortResolver, StatusFilter,
};

/// Builds a [`RideQuery`] from listing parameters.
///
/// Stage order: status filter, email filter, distance annotation (only when
/// `lat` or `lon` is present), sort, event window. Filters narrow the rows
/// before annotation and sorting; the event window is applied last so the
/// secondary event query only covers the page that is finally returned.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use rideshare::domain::{RideListParams, RideOrdering, RideQueryPipeline};
///
/// let pipeline = RideQueryPipeline::new(Arc::new(DefaultClock));
/// let params = RideListParams {
///     lat: Some("10.31445".into()),
///     lon: Some("123.9781".into()),
///     sort_by: Some("distance".into()),
///     ..RideListParams::default()
/// };
/// let query = pipeline.build(&params).unwrap();
/// assert!(query.is_annotated());
/// assert_eq!(query.ordering(), RideOrdering::Distance);
/// ```
#[derive(Clone)]
pub struct RideQueryPipeline {
    event_window: EventWindowPrefetcher,
}

impl RideQueryPipeline {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            event_window: EventWindowPrefetcher::new(clock),
        }
    }

    /// Run every stage and return the composed, unexecuted query.
    pub fn build(&self, params: &RideListParams) -> Result<RideQuery, RideQueryError> {
        let query = StatusFilter.apply(RideQuery::new(), params)?;
        let query = EmailFilter.apply(query, params)?;
        let query = if DistanceAnnotator::requested(params) {
            DistanceAnnotator.apply(query, params)?
        } else {
            query
        };
        let query = SortResolver.apply(query, params)?;
        let query = self.event_window.apply(query, params)?;
        debug!(
            status = ?query.status(),
            annotated = query.is_annotated(),
            ordering = query.ordering().as_str(),
            "ride listing query built"
        );
        Ok(query)
    }
}

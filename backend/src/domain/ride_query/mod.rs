//! Ride listing query description and the pipeline that builds it.
//!
//! A [`RideQuery`] is an immutable value: filters, an optional distance
//! annotation, an ordering and an event prefetch window. Nothing touches the
//! store until a repository executes it. Each stage in this module folds one
//! group of listing parameters into the description and can be exercised on
//! its own.

use chrono::{DateTime, Utc};

use super::{Error, GeoPoint, RideStatus};

mod distance;
mod email_filter;
mod event_window;
mod pipeline;
mod sort;
mod status_filter;

pub use distance::DistanceAnnotator;
pub use email_filter::EmailFilter;
pub use event_window::{EVENT_WINDOW_HOURS, EventWindowPrefetcher};
pub use pipeline::RideQueryPipeline;
pub use sort::SortResolver;
pub use status_filter::StatusFilter;

/// Raw listing parameters as received from the caller.
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RideListParams {
    pub status: Option<String>,
    pub email: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub sort_by: Option<String>,
}

/// Return the parameter value when it is present and non-empty.
pub(crate) fn provided(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.is_empty())
}

/// Ordering applied to listed rides. Ride id always breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RideOrdering {
    #[default]
    PickupTime,
    Distance,
}

impl RideOrdering {
    /// Every ordering, in the order reported to callers.
    pub const ALL: [RideOrdering; 2] = [RideOrdering::PickupTime, RideOrdering::Distance];

    /// Value accepted in the `sort_by` parameter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PickupTime => "pickup_time",
            Self::Distance => "distance",
        }
    }
}

/// Lower bound for events attached to each listed ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    since: DateTime<Utc>,
}

impl EventWindow {
    /// Include events created at or after `since`.
    pub const fn since(since: DateTime<Utc>) -> Self {
        Self { since }
    }

    /// Inclusive cutoff.
    pub const fn cutoff(&self) -> DateTime<Utc> {
        self.since
    }

    /// Whether an event timestamp falls inside the window.
    pub fn contains(&self, created_at: DateTime<Utc>) -> bool {
        created_at >= self.since
    }
}

/// Unexecuted description of a ride listing.
///
/// Rider and driver are always joined by the executing repository.
///
/// # Examples
/// ```
/// use rideshare::domain::{GeoPoint, RideOrdering, RideQuery, RideStatus};
///
/// let query = RideQuery::new()
///     .with_status(RideStatus::Pickup)
///     .annotate_distance(GeoPoint::new(45.0, 130.0))
///     .order_by(RideOrdering::Distance);
/// assert!(query.is_annotated());
/// assert_eq!(query.status(), Some(RideStatus::Pickup));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideQuery {
    status: Option<RideStatus>,
    rider_email: Option<String>,
    distance_from: Option<GeoPoint>,
    ordering: RideOrdering,
    event_window: Option<EventWindow>,
}

impl RideQuery {
    /// Unfiltered listing ordered by pickup time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rides with exactly `status`.
    pub fn with_status(mut self, status: RideStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Keep rides whose rider email equals `email`, ignoring case.
    pub fn with_rider_email(mut self, email: impl Into<String>) -> Self {
        self.rider_email = Some(email.into());
        self
    }

    /// Attach the pickup distance from `reference` to every row.
    pub fn annotate_distance(mut self, reference: GeoPoint) -> Self {
        self.distance_from = Some(reference);
        self
    }

    /// Replace the ordering.
    ///
    /// Ordering by [`RideOrdering::Distance`] requires a prior
    /// [`RideQuery::annotate_distance`]; stores reject the query otherwise.
    pub fn order_by(mut self, ordering: RideOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Prefetch events that fall inside `window`.
    pub fn prefetch_events(mut self, window: EventWindow) -> Self {
        self.event_window = Some(window);
        self
    }

    pub fn status(&self) -> Option<RideStatus> {
        self.status
    }

    pub fn rider_email(&self) -> Option<&str> {
        self.rider_email.as_deref()
    }

    pub fn distance_from(&self) -> Option<GeoPoint> {
        self.distance_from
    }

    pub fn ordering(&self) -> RideOrdering {
        self.ordering
    }

    pub fn event_window(&self) -> Option<EventWindow> {
        self.event_window
    }

    /// Whether a distance annotation is present.
    pub fn is_annotated(&self) -> bool {
        self.distance_from.is_some()
    }

    /// Whether the ordering can be evaluated against the annotations.
    pub fn is_ordering_satisfiable(&self) -> bool {
        self.ordering != RideOrdering::Distance || self.is_annotated()
    }
}

/// Caller input errors raised while building a [`RideQuery`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RideQueryError {
    #[error("status must be in {}", RideStatus::allowed_values())]
    UnknownStatus,
    #[error("You must provide values for lat and lon")]
    MissingCoordinates,
    #[error("lat and lon must both be float type")]
    NonNumericCoordinates,
    #[error("sort_key must be in ('pickup_time', 'distance')")]
    UnknownSortKey,
}

impl RideQueryError {
    /// Query parameters the error refers to.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::UnknownStatus => &["status"],
            Self::MissingCoordinates | Self::NonNumericCoordinates => &["lat", "lon"],
            Self::UnknownSortKey => &["sort_by"],
        }
    }

    /// Machine-readable validation code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownStatus | Self::UnknownSortKey => "invalid_choice",
            Self::MissingCoordinates => "required",
            Self::NonNumericCoordinates => "invalid_float",
        }
    }
}

/// Ordered step of the listing pipeline.
pub trait RideQueryStage: Send + Sync {
    /// Fold the stage's parameters into `query`.
    fn apply(
        &self,
        query: RideQuery,
        params: &RideListParams,
    ) -> Result<RideQuery, RideQueryError>;
}

impl From<RideQueryError> for Error {
    fn from(err: RideQueryError) -> Self {
        Error::invalid_request(err.to_string()).with_details(serde_json::json!({
            "fields": err.fields(),
            "code": err.code(),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn default_query_is_unfiltered_and_ordered_by_pickup_time() {
        let query = RideQuery::new();
        assert_eq!(query.status(), None);
        assert_eq!(query.rider_email(), None);
        assert!(!query.is_annotated());
        assert_eq!(query.ordering(), RideOrdering::PickupTime);
        assert_eq!(query.event_window(), None);
    }

    #[rstest]
    fn distance_ordering_needs_annotation() {
        let unannotated = RideQuery::new().order_by(RideOrdering::Distance);
        assert!(!unannotated.is_ordering_satisfiable());

        let annotated = unannotated.annotate_distance(GeoPoint::new(0.0, 0.0));
        assert!(annotated.is_ordering_satisfiable());
    }

    #[rstest]
    fn event_window_includes_its_cutoff() {
        let cutoff = Utc::now();
        let window = EventWindow::since(cutoff);
        assert!(window.contains(cutoff));
        assert!(!window.contains(cutoff - chrono::Duration::seconds(1)));
    }

    #[rstest]
    #[case(RideQueryError::UnknownStatus, "status must be in ['init', 'pickup', 'enroute', 'dropoff']")]
    #[case(RideQueryError::MissingCoordinates, "You must provide values for lat and lon")]
    #[case(RideQueryError::NonNumericCoordinates, "lat and lon must both be float type")]
    #[case(RideQueryError::UnknownSortKey, "sort_key must be in ('pickup_time', 'distance')")]
    fn errors_become_invalid_requests(#[case] err: RideQueryError, #[case] message: &str) {
        let fields = err.fields();
        let domain: Error = err.into();
        assert_eq!(domain.code(), ErrorCode::InvalidRequest);
        assert_eq!(domain.message(), message);
        let details = domain.details().expect("details attached");
        assert_eq!(details["fields"], serde_json::json!(fields));
    }
}

//! Attach the trailing window of ride events to listed rides.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;

use super::{EventWindow, RideListParams, RideQuery, RideQueryError, RideQueryStage};

/// Length of the trailing event window.
pub const EVENT_WINDOW_HOURS: i64 = 24;

/// Sets the event window to the 24 hours before the clock's current time.
#[derive(Clone)]
pub struct EventWindowPrefetcher {
    clock: Arc<dyn Clock>,
}

impl EventWindowPrefetcher {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl RideQueryStage for EventWindowPrefetcher {
    fn apply(
        &self,
        query: RideQuery,
        _params: &RideListParams,
    ) -> Result<RideQuery, RideQueryError> {
        let cutoff = self.clock.utc() - Duration::hours(EVENT_WINDOW_HOURS);
        Ok(query.prefetch_events(EventWindow::since(cutoff)))
    }
}

//! Ride events: timestamped notes on a ride's progress.
//!
//! `created_at` is the time the event happened, which callers may backdate;
//! it is not necessarily the insertion time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RideId;
use super::user::text_newtype;

/// Maximum length of an event description.
pub const DESCRIPTION_MAX: usize = 1024;

/// Database identifier of a ride event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideEventId(i64);

impl RideEventId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RideEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when a description exceeds [`DESCRIPTION_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("description must be at most {max} characters")]
pub struct DescriptionTooLong {
    pub max: usize,
}

/// Free-text event description; may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventDescription(String);

impl EventDescription {
    /// Validate the description length.
    pub fn new(value: impl Into<String>) -> Result<Self, DescriptionTooLong> {
        let value = value.into();
        if value.chars().count() > DESCRIPTION_MAX {
            return Err(DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Wrap a stored description without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }
}

text_newtype!(EventDescription);

/// Stored ride event.
#[derive(Debug, Clone, PartialEq)]
pub struct RideEvent {
    pub id: RideEventId,
    pub ride_id: RideId,
    pub description: EventDescription,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

/// Input for creating a ride event. A missing `created_at` means "now".
#[derive(Debug, Clone, PartialEq)]
pub struct RideEventDraft {
    pub ride_id: RideId,
    pub description: EventDescription,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fully resolved event fields handed to a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RideEventRecord {
    pub ride_id: RideId,
    pub description: EventDescription,
    pub created_at: DateTime<Utc>,
}

/// Partial changes to an event. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideEventPatch {
    pub ride_id: Option<RideId>,
    pub description: Option<EventDescription>,
    pub created_at: Option<DateTime<Utc>>,
}

impl RideEventPatch {
    /// Overlay the patch on `event`.
    pub fn apply_to(self, event: &RideEvent) -> RideEventRecord {
        RideEventRecord {
            ride_id: self.ride_id.unwrap_or(event.ride_id),
            description: self
                .description
                .unwrap_or_else(|| event.description.clone()),
            created_at: self.created_at.unwrap_or(event.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("Passenger picked up", true)]
    #[case(&"x".repeat(DESCRIPTION_MAX), true)]
    #[case(&"x".repeat(DESCRIPTION_MAX + 1), false)]
    fn description_length_is_bounded(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(EventDescription::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn patch_overlays_selected_fields() {
        let at = Utc::now();
        let event = RideEvent {
            id: RideEventId::new(4),
            ride_id: RideId::new(1),
            description: EventDescription::new("Status changed to pickup").expect("valid"),
            created_at: at,
            last_modified_at: at,
        };
        let patch = RideEventPatch {
            description: Some(EventDescription::new("Status changed to dropoff").expect("valid")),
            ..RideEventPatch::default()
        };

        let record = patch.apply_to(&event);
        assert_eq!(record.ride_id, RideId::new(1));
        assert_eq!(record.description.as_ref(), "Status changed to dropoff");
        assert_eq!(record.created_at, at);
    }
}

//! Ride data model.
//!
//! Ride status is informational: any status may be written at any time, and
//! no transition rules are enforced here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::quoted_list;
use super::{CoordinateError, GeoPoint, RideEvent, User, UserId};

/// Database identifier of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(i64);

impl RideId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when a status string is not one of the four known codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be in {}", RideStatus::allowed_values())]
pub struct UnknownRideStatus;

/// Lifecycle label of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    #[default]
    Init,
    Pickup,
    Enroute,
    Dropoff,
}

impl RideStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [RideStatus; 4] = [
        RideStatus::Init,
        RideStatus::Pickup,
        RideStatus::Enroute,
        RideStatus::Dropoff,
    ];

    /// Stored and serialised value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Pickup => "pickup",
            Self::Enroute => "enroute",
            Self::Dropoff => "dropoff",
        }
    }

    /// Valid values rendered as `['init', 'pickup', 'enroute', 'dropoff']`.
    pub fn allowed_values() -> String {
        quoted_list(Self::ALL.iter().map(|status| status.as_str()))
    }
}

impl std::str::FromStr for RideStatus {
    type Err = UnknownRideStatus;

    /// Case-sensitive: `"INIT"` is rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or(UnknownRideStatus)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored ride.
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub id: RideId,
    pub status: RideStatus,
    pub rider_id: UserId,
    pub driver_id: UserId,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub pickup_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

/// Validated input for creating or replacing a ride.
#[derive(Debug, Clone, PartialEq)]
pub struct RideDraft {
    pub status: RideStatus,
    pub rider_id: UserId,
    pub driver_id: UserId,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub pickup_time: DateTime<Utc>,
}

/// Partial changes to a ride. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidePatch {
    pub status: Option<RideStatus>,
    pub rider_id: Option<UserId>,
    pub driver_id: Option<UserId>,
    pub pickup_latitude: Option<f64>,
    pub pickup_longitude: Option<f64>,
    pub dropoff_latitude: Option<f64>,
    pub dropoff_longitude: Option<f64>,
    pub pickup_time: Option<DateTime<Utc>>,
}

impl RidePatch {
    /// Overlay the patch on `ride`, yielding the replacement draft.
    ///
    /// Coordinates are merged one component at a time, so the merged points
    /// are range checked again.
    pub fn apply_to(self, ride: &Ride) -> Result<RideDraft, CoordinateError> {
        let pickup = GeoPoint::validated(
            self.pickup_latitude.unwrap_or(ride.pickup.latitude),
            self.pickup_longitude.unwrap_or(ride.pickup.longitude),
        )?;
        let dropoff = GeoPoint::validated(
            self.dropoff_latitude.unwrap_or(ride.dropoff.latitude),
            self.dropoff_longitude.unwrap_or(ride.dropoff.longitude),
        )?;
        Ok(RideDraft {
            status: self.status.unwrap_or(ride.status),
            rider_id: self.rider_id.unwrap_or(ride.rider_id),
            driver_id: self.driver_id.unwrap_or(ride.driver_id),
            pickup,
            dropoff,
            pickup_time: self.pickup_time.unwrap_or(ride.pickup_time),
        })
    }
}

/// Ride joined with its participants, as produced by a listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct RideListRow {
    pub ride: Ride,
    pub rider: User,
    pub driver: User,
    /// Kilometres from the query's reference point, when one was given.
    pub distance_km: Option<f64>,
}

/// Listing entry: a joined ride plus its events from the trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedRide {
    pub ride: Ride,
    pub rider: User,
    pub driver: User,
    pub distance_km: Option<f64>,
    /// Always present; empty when no event falls inside the window.
    pub todays_ride_events: Vec<RideEvent>,
}

impl ListedRide {
    /// Attach prefetched events to a listing row.
    pub fn from_row(row: RideListRow, todays_ride_events: Vec<RideEvent>) -> Self {
        let RideListRow {
            ride,
            rider,
            driver,
            distance_km,
        } = row;
        Self {
            ride,
            rider,
            driver,
            distance_km,
            todays_ride_events,
        }
    }
}

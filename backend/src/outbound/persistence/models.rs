//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! reach the domain. Stored rows are trusted, so text columns are wrapped
//! without re-validation; only enumerated columns are parsed.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{auth_tokens, ride_events, rides, users};
use crate::domain::{
    EmailAddress, EventDescription, GeoPoint, PasswordHash, PersonName, PhoneNumber, Ride,
    RideEvent, RideEventId, RideId, RideStatus, Role, User, UserId, Username,
};

/// A stored value that no longer parses into its domain type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stored {column}: {value:?}")]
pub(crate) struct InvalidRow {
    pub column: &'static str,
    pub value: String,
}

pub(crate) fn parse_role(value: String) -> Result<Role, InvalidRow> {
    value.parse().map_err(|_| InvalidRow {
        column: "users.role",
        value,
    })
}

pub(crate) fn parse_status(value: String) -> Result<RideStatus, InvalidRow> {
    value.parse().map_err(|_| InvalidRow {
        column: "rides.status",
        value,
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: String,
    pub is_active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl UserRow {
    /// Split the row into the domain user and its password hash.
    pub(crate) fn into_parts(self) -> Result<(User, PasswordHash), InvalidRow> {
        let user = User {
            id: UserId::new(self.id),
            username: Username::from_stored(self.username),
            email: EmailAddress::from_stored(self.email),
            first_name: PersonName::from_stored(self.first_name),
            last_name: PersonName::from_stored(self.last_name),
            phone_number: PhoneNumber::from_stored(self.phone_number),
            role: parse_role(self.role)?,
            is_active: self.is_active,
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
        };
        Ok((user, PasswordHash::new(self.password_hash)))
    }

    pub(crate) fn into_user(self) -> Result<User, InvalidRow> {
        self.into_parts().map(|(user, _)| user)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub password_hash: &'a str,
}

/// Partial user update; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub role: Option<&'a str>,
    pub is_active: Option<bool>,
    pub password_hash: Option<&'a str>,
    pub last_modified_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub key: &'a str,
    pub user_id: i64,
}

// ---------------------------------------------------------------------------
// Rides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RideRow {
    pub id: i64,
    pub status: String,
    pub rider_id: i64,
    pub driver_id: i64,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub pickup_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl TryFrom<RideRow> for Ride {
    type Error = InvalidRow;

    fn try_from(row: RideRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RideId::new(row.id),
            status: parse_status(row.status)?,
            rider_id: UserId::new(row.rider_id),
            driver_id: UserId::new(row.driver_id),
            pickup: GeoPoint::new(row.pickup_latitude, row.pickup_longitude),
            dropoff: GeoPoint::new(row.dropoff_latitude, row.dropoff_longitude),
            pickup_time: row.pickup_time,
            created_at: row.created_at,
            last_modified_at: row.last_modified_at,
        })
    }
}

/// Full ride column set, used for inserts and replacements.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = rides)]
pub(crate) struct RideValues<'a> {
    pub status: &'a str,
    pub rider_id: i64,
    pub driver_id: i64,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub pickup_time: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ride events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ride_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RideEventRow {
    pub id: i64,
    pub ride_id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl From<RideEventRow> for RideEvent {
    fn from(row: RideEventRow) -> Self {
        Self {
            id: RideEventId::new(row.id),
            ride_id: RideId::new(row.ride_id),
            description: EventDescription::from_stored(row.description),
            created_at: row.created_at,
            last_modified_at: row.last_modified_at,
        }
    }
}

/// Full ride event column set, used for inserts and replacements.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = ride_events)]
pub(crate) struct RideEventValues<'a> {
    pub ride_id: i64,
    pub description: &'a str,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

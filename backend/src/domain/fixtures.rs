//! Builders for domain values shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use super::{
    EmailAddress, EventDescription, GeoPoint, PersonName, PhoneNumber, Ride, RideEvent,
    RideEventId, RideId, RideStatus, Role, User, UserId, Username,
};

pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 2, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn user(id: i64, username: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
        first_name: PersonName::default(),
        last_name: PersonName::default(),
        phone_number: PhoneNumber::default(),
        role,
        is_active: true,
        created_at: at(0, 0),
        last_modified_at: at(0, 0),
    }
}

pub(crate) fn ride(id: i64, rider: i64, driver: i64) -> Ride {
    Ride {
        id: RideId::new(id),
        status: RideStatus::Init,
        rider_id: UserId::new(rider),
        driver_id: UserId::new(driver),
        pickup: GeoPoint::new(10.3168, 123.8906),
        dropoff: GeoPoint::new(10.3291, 123.9058),
        pickup_time: at(9, 0),
        created_at: at(0, 0),
        last_modified_at: at(0, 0),
    }
}

pub(crate) fn event(id: i64, ride: i64, description: &str, created_at: DateTime<Utc>) -> RideEvent {
    RideEvent {
        id: RideEventId::new(id),
        ride_id: RideId::new(ride),
        description: EventDescription::new(description).expect("valid description"),
        created_at,
        last_modified_at: created_at,
    }
}

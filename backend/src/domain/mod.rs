//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed rideshare entities, the ride listing query
//! pipeline and the services behind the driving ports. Nothing in here knows
//! about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable identifiers.
//! - User, Ride, RideEvent and their drafts and patches.
//! - RideQuery / RideQueryPipeline: the composable ride listing description.
//! - Services implementing the ports in [`ports`].

pub mod auth;
mod auth_service;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod geo;
mod paged;
pub mod ports;
pub mod ride;
pub mod ride_event;
mod ride_event_service;
pub mod ride_query;
mod ride_service;
pub mod trace_id;
pub mod user;
mod user_service;

pub use self::auth::{
    AuthToken, LoginCredentials, LoginValidationError, MalformedToken, TOKEN_LEN,
};
pub use self::auth_service::AuthenticationService;
pub use self::error::{Error, ErrorCode};
pub use self::geo::{CoordinateError, EARTH_RADIUS_KM, GeoPoint};
pub use self::paged::Paged;
pub use self::ride::{
    ListedRide, Ride, RideDraft, RideId, RideListRow, RidePatch, RideStatus, UnknownRideStatus,
};
pub use self::ride_event::{
    DESCRIPTION_MAX, DescriptionTooLong, EventDescription, RideEvent, RideEventDraft, RideEventId,
    RideEventPatch, RideEventRecord,
};
pub use self::ride_event_service::RideEventService;
pub use self::ride_query::{
    EventWindow, RideListParams, RideOrdering, RideQuery, RideQueryError, RideQueryPipeline,
    RideQueryStage,
};
pub use self::ride_service::RideService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NAME_MAX, NewUser, Password, PasswordHash, PersonName, PhoneNumber,
    Role, User, UserChanges, UserCredentials, UserDraft, UserId, UserPatch, UserValidationError,
    Username,
};
pub use self::user_service::UserService;

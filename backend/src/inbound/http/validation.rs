//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes `400 invalid_request` with
//! `{"field": ..., "code": ...}` details so clients can point at the
//! offending input.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{
    CoordinateError, Error, GeoPoint, RideStatus, Role, UnknownRideStatus, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    Required,
    InvalidChoice,
    InvalidTimestamp,
    OutOfRange,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidChoice => "invalid_choice",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: &str, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn coded(field: FieldName, message: impl Into<String>, code: ValidationCode) -> Error {
    field_error(field.as_str(), message, code.as_str())
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    coded(
        field,
        format!("{}: This field is required.", field.as_str()),
        ValidationCode::Required,
    )
}

/// Unwrap a required payload field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_rfc3339_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            coded(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                ValidationCode::InvalidTimestamp,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

pub(crate) fn parse_role(value: &str) -> Result<Role, Error> {
    value.parse().map_err(|_| {
        coded(
            FieldName::new("role"),
            format!("role must be in {}", Role::allowed_values()),
            ValidationCode::InvalidChoice,
        )
    })
}

pub(crate) fn parse_status(value: &str) -> Result<RideStatus, Error> {
    value.parse().map_err(|err: UnknownRideStatus| {
        coded(
            FieldName::new("status"),
            err.to_string(),
            ValidationCode::InvalidChoice,
        )
    })
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    field_error(err.field(), err.to_string(), err.code())
}

/// Range check a latitude/longitude pair named `{prefix}_latitude` and
/// `{prefix}_longitude`.
pub(crate) fn validated_point(prefix: &str, latitude: f64, longitude: f64) -> Result<GeoPoint, Error> {
    GeoPoint::validated(latitude, longitude).map_err(|err| {
        let component = match err {
            CoordinateError::LatitudeOutOfRange => "latitude",
            CoordinateError::LongitudeOutOfRange => "longitude",
        };
        field_error(
            &format!("{prefix}_{component}"),
            err.to_string(),
            ValidationCode::OutOfRange.as_str(),
        )
    })
}

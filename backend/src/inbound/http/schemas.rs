//! OpenAPI schemas for paginated envelopes.
//!
//! `pagination::Page` stays free of OpenAPI dependencies, so each concrete
//! envelope is described here with the same field layout.

use utoipa::ToSchema;

use crate::inbound::http::ride_events::RideEventResponse;
use crate::inbound::http::rides::ListedRideResponse;
use crate::inbound::http::users::UserResponse;

macro_rules! page_schema {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(ToSchema)]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $name {
            /// Total number of rows across all pages.
            #[schema(example = 1)]
            count: usize,
            /// Absolute link to the following page.
            next: Option<String>,
            /// Absolute link to the preceding page.
            previous: Option<String>,
            /// Rows on this page.
            results: Vec<$item>,
        }
    };
}

page_schema!(
    /// One page of users.
    UserPage,
    UserResponse
);
page_schema!(
    /// One page of rides in the listing representation.
    RidePage,
    ListedRideResponse
);
page_schema!(
    /// One page of ride events.
    RideEventPage,
    RideEventResponse
);

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;
    use utoipa::openapi::{RefOr, schema::Schema};

    #[rstest]
    fn envelopes_expose_pagination_fields() {
        let RefOr::T(Schema::Object(object)) = RidePage::schema() else {
            panic!("RidePage should be an inline object schema");
        };
        for field in ["count", "next", "previous", "results"] {
            assert!(object.properties.contains_key(field), "missing {field}");
        }
        assert!(object.required.iter().any(|name| name == "results"));
        assert!(!object.required.iter().any(|name| name == "next"));
    }
}

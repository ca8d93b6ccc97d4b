//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every REST endpoint, the error envelope and the
//! paginated list schemas. Management endpoints require the `Token` scheme:
//! an `Authorization: Token <key>` header obtained from `POST /auth/login/`.
//!
//! The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::schemas::{RideEventPage, RidePage, UserPage};

/// Register the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "Token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` with the key returned by POST /auth/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rideshare admin API",
        description = "Manage users, rides and ride events; list rides by status, rider email and distance."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("Token" = [])),
    paths(
        crate::inbound::http::accounts::sign_up,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::replace_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::rides::list_rides,
        crate::inbound::http::rides::create_ride,
        crate::inbound::http::rides::get_ride,
        crate::inbound::http::rides::replace_ride,
        crate::inbound::http::rides::update_ride,
        crate::inbound::http::rides::delete_ride,
        crate::inbound::http::ride_events::list_ride_events,
        crate::inbound::http::ride_events::create_ride_event,
        crate::inbound::http::ride_events::get_ride_event,
        crate::inbound::http::ride_events::replace_ride_event,
        crate::inbound::http::ride_events::update_ride_event,
        crate::inbound::http::ride_events::delete_ride_event,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, UserPage, RidePage, RideEventPage)),
    tags(
        (name = "auth", description = "Sign-up and token login"),
        (name = "users", description = "User management"),
        (name = "rides", description = "Ride management and the filtered ride listing"),
        (name = "ride-events", description = "Ride event management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

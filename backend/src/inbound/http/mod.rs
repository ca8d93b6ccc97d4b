//! HTTP inbound adapter exposing the REST API.
//!
//! Routes keep their trailing slash (`/rides/`, `/rides/{id}/`). All
//! management endpoints require an admin token; see [`auth`].

use actix_web::web;

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod pagination;
pub mod ride_events;
pub mod rides;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the API routes and the extractor error handlers that render
/// malformed bodies, query strings and path segments as API errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(accounts::sign_up)
        .service(accounts::login)
        .service(accounts::logout)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::replace_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(rides::list_rides)
        .service(rides::create_ride)
        .service(rides::get_ride)
        .service(rides::replace_ride)
        .service(rides::update_ride)
        .service(rides::delete_ride)
        .service(ride_events::list_ride_events)
        .service(ride_events::create_ride_event)
        .service(ride_events::get_ride_event)
        .service(ride_events::replace_ride_event)
        .service(ride_events::update_ride_event)
        .service(ride_events::delete_ride_event);
}

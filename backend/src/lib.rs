//! Rideshare admin backend.
//!
//! Hexagonal layout: [`domain`] holds entities, the ride listing pipeline,
//! services and ports; [`inbound::http`] adapts them to actix-web;
//! [`outbound`] provides PostgreSQL and in-memory repositories;
//! [`server`] wires everything into an application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

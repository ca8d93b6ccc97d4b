//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! The REST API under [`http`] is the only transport.

pub mod http;

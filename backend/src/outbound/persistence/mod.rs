//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one domain port on top of a shared [`DbPool`].
//! Row structs and table definitions stay private to this module; adapters
//! translate them into domain types and map database failures into the
//! port's error enum.
//!
//! ```ignore
//! use rideshare::outbound::persistence::{DbPool, DieselRideRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rideshare")).await?;
//! let rides = DieselRideRepository::new(pool);
//! ```

mod diesel_auth_token_repository;
mod diesel_basic_error_mapping;
mod diesel_ride_event_repository;
mod diesel_ride_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod ride_list_sql;
mod schema;

pub use diesel_auth_token_repository::DieselAuthTokenRepository;
pub use diesel_ride_event_repository::DieselRideEventRepository;
pub use diesel_ride_repository::DieselRideRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: an in-process store for tests and database-less runs
//! - **credentials**: bcrypt password hashing
//!
//! Adapters translate between domain types and their backing store. They
//! contain no business logic.

pub mod credentials;
pub mod memory;
pub mod persistence;

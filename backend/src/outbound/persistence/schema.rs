//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts. Rows are never deleted; `is_active` marks soft deletion.
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        phone_number -> Varchar,
        /// `admin` or `regular`.
        role -> Varchar,
        is_active -> Bool,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        last_modified_at -> Timestamptz,
    }
}

diesel::table! {
    /// One API token per user.
    auth_tokens (key) {
        key -> Varchar,
        user_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    rides (id) {
        id -> Int8,
        /// `init`, `pickup`, `enroute` or `dropoff`.
        status -> Varchar,
        rider_id -> Int8,
        driver_id -> Int8,
        pickup_latitude -> Float8,
        pickup_longitude -> Float8,
        dropoff_latitude -> Float8,
        dropoff_longitude -> Float8,
        pickup_time -> Timestamptz,
        created_at -> Timestamptz,
        last_modified_at -> Timestamptz,
    }
}

diesel::table! {
    /// Status notes attached to a ride; cascade deleted with it.
    ride_events (id) {
        id -> Int8,
        ride_id -> Int8,
        description -> Varchar,
        /// Time the event happened, supplied by the caller.
        created_at -> Timestamptz,
        last_modified_at -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(ride_events -> rides (ride_id));

diesel::allow_tables_to_appear_in_same_query!(auth_tokens, ride_events, rides, users);

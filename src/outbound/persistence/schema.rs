//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the embedded migrations exactly. The `incidents`
//! table also carries a generated `geom` geography column maintained by
//! PostgreSQL; it is only reachable through raw SQL and is deliberately
//! absent here so typed queries never select it.

diesel::table! {
    /// Danger zone catalogue.
    incidents (id) {
        id -> Int4,
        /// Unique human-readable name.
        title -> Varchar,
        description -> Text,
        lat -> Float8,
        long -> Float8,
        radius_m -> Int4,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only log of nearest-zone decisions.
    location_checks (id) {
        id -> Int4,
        user_id -> Text,
        lat -> Float8,
        long -> Float8,
        in_danger_zone -> Bool,
        /// Set exactly when `in_danger_zone` is true.
        nearest_id -> Nullable<Int4>,
        checked_at -> Timestamptz,
    }
}

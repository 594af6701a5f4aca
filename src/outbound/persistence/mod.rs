//! PostgreSQL persistence adapters.

mod diesel_check_repository;
mod diesel_zone_repository;
mod migrations;
mod models;
mod pool;
pub mod schema;

pub use diesel_check_repository::DieselCheckRepository;
pub use diesel_zone_repository::DieselZoneRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

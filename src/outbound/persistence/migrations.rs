//! Startup schema migrations.
//!
//! The SQL files are embedded at build time and applied in order on
//! every boot; each statement is written to be idempotent so a restart
//! against an already-migrated database is a no-op.

use diesel_async::SimpleAsyncConnection;
use tracing::info;

use super::pool::{DbPool, PoolError};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_create_incidents",
        include_str!("../../../migrations/0001_create_incidents.sql"),
    ),
    (
        "0002_create_location_checks",
        include_str!("../../../migrations/0002_create_location_checks.sql"),
    ),
];

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to get connection for migrations: {0}")]
    Pool(#[from] PoolError),
    #[error("migration {name} failed: {source}")]
    Apply {
        name: &'static str,
        source: diesel::result::Error,
    },
}

/// Apply every embedded migration.
pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get().await?;
    for &(name, sql) in MIGRATIONS {
        conn.batch_execute(sql)
            .await
            .map_err(|source| MigrationError::Apply { name, source })?;
        info!(migration = name, "migration applied");
    }
    Ok(())
}

//! Driven port for the append-only location check log.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{LocationCheck, ZoneStat};

/// Errors raised by the check persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckRepositoryError {
    /// Store connection could not be established or timed out.
    #[error("check store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("check store query failed: {message}")]
    Query { message: String },
}

impl CheckRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for recording checks and aggregating them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckRepository: Send + Sync {
    /// Decide and record in one transaction: find the nearest active zone
    /// containing the point, then insert the check row with the derived
    /// `(in_danger_zone, nearest_id)` pair. Either both effects commit or
    /// neither does.
    async fn record_check(
        &self,
        user_id: &str,
        lat: f64,
        long: f64,
    ) -> Result<LocationCheck, CheckRepositoryError>;

    /// Distinct in-danger users per zone over the trailing window,
    /// ordered by zone id ascending.
    async fn aggregate_by_zone(
        &self,
        window_minutes: i64,
    ) -> Result<Vec<ZoneStat>, CheckRepositoryError>;
}

//! Driven port for the durable zone catalogue.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewZone, Zone};

/// Errors raised by the zone persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneRepositoryError {
    /// Store connection could not be established or timed out.
    #[error("zone store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("zone store query failed: {message}")]
    Query { message: String },
    /// Another zone already carries this title.
    ///
    /// Only a unique-constraint violation on `title` may produce this
    /// variant; services translate it to the `AlreadyExists` domain error.
    #[error("zone title already exists: {message}")]
    DuplicateTitle { message: String },
    /// No zone matched the requested id.
    #[error("zone not found")]
    NotFound,
}

impl ZoneRepositoryError {
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

    pub fn duplicate_title(message: impl Into<String>) -> Self {
        Self::DuplicateTitle {
            message: message.into(),
        }
    }
}

/// Port for zone catalogue persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Insert a zone; the store assigns `id` and both timestamps.
    async fn create(&self, zone: &NewZone) -> Result<Zone, ZoneRepositoryError>;

    /// Fetch one zone by id.
    async fn get_by_id(&self, id: i32) -> Result<Zone, ZoneRepositoryError>;

    /// One page ordered by `created_at` descending, plus the current row
    /// count. The two reads may race with concurrent writers.
    async fn paginate(&self, limit: i64, offset: i64)
        -> Result<(Vec<Zone>, i64), ZoneRepositoryError>;

    /// Hard-delete one zone.
    async fn delete(&self, id: i32) -> Result<(), ZoneRepositoryError>;

    /// Overwrite every mutable column and refresh `updated_at`.
    async fn full_update(&self, id: i32, fields: &NewZone) -> Result<Zone, ZoneRepositoryError>;
}

//! Driven port for the read-through zone cache.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by the caching adapter.
///
/// Callers treat every variant as non-fatal: a failing cache downgrades
/// to a store read, never to a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneCacheError {
    /// Cache backend is unavailable or timing out.
    #[error("zone cache backend failure: {message}")]
    Backend { message: String },
}

impl ZoneCacheError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Port for opaque byte payloads cached per zone.
///
/// Entries expire after 15 idle minutes; a successful `get` resets the
/// clock (sliding expiration).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneCache: Send + Sync {
    /// Read a payload; a miss is `Ok(None)`. A hit refreshes the TTL.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ZoneCacheError>;

    /// Store a payload under the idle TTL.
    async fn save(&self, key: &str, payload: &[u8]) -> Result<(), ZoneCacheError>;

    /// Drop a payload; returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, ZoneCacheError>;
}

/// Fixture cache that always misses and discards writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureZoneCache;

#[async_trait]
impl ZoneCache for FixtureZoneCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, ZoneCacheError> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _payload: &[u8]) -> Result<(), ZoneCacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool, ZoneCacheError> {
        Ok(false)
    }
}

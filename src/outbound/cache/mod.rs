//! Redis-backed zone cache adapter.
//!
//! Entries carry a 15-minute idle TTL. Reads go through `GETEX` so every
//! hit pushes the expiry out again (sliding expiration); only the zone
//! service decides what the cached bytes mean.

use async_trait::async_trait;
use redis::{AsyncCommands, Expiry};

use crate::domain::ports::{ZoneCache, ZoneCacheError};
use crate::outbound::RedisPool;

const IDLE_TTL_SECS: u64 = 15 * 60;

/// Redis implementation of the zone cache port.
#[derive(Clone)]
pub struct RedisZoneCache {
    pool: RedisPool,
}

impl RedisZoneCache {
    /// Create a new cache over the given connection pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

fn map_redis_error(error: redis::RedisError) -> ZoneCacheError {
    ZoneCacheError::backend(error.to_string())
}

fn map_pool_error(error: bb8::RunError<redis::RedisError>) -> ZoneCacheError {
    ZoneCacheError::backend(error.to_string())
}

#[async_trait]
impl ZoneCache for RedisZoneCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ZoneCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let payload: Option<Vec<u8>> = conn
            .get_ex(key, Expiry::EX(IDLE_TTL_SECS))
            .await
            .map_err(map_redis_error)?;
        Ok(payload)
    }

    async fn save(&self, key: &str, payload: &[u8]) -> Result<(), ZoneCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.set_ex::<_, _, ()>(key, payload, IDLE_TTL_SECS)
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<bool, ZoneCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed: i64 = conn.del(key).await.map_err(map_redis_error)?;
        Ok(removed > 0)
    }
}

//! Outbound adapters: PostgreSQL persistence, Redis cache and queue,
//! and the reqwest webhook sink.

pub mod cache;
pub mod persistence;
pub mod queue;
pub mod webhook;

pub use cache::RedisZoneCache;
pub use persistence::{DbPool, DieselCheckRepository, DieselZoneRepository, PoolConfig};
pub use queue::RedisDeliveryQueue;
pub use webhook::ReqwestWebhookSink;

use bb8_redis::RedisConnectionManager;

/// Shared Redis connection pool used by the cache and queue adapters.
pub type RedisPool = bb8::Pool<RedisConnectionManager>;

/// Build a Redis pool from a connection URL.
///
/// # Errors
///
/// Returns a [`redis::RedisError`] when the URL is malformed or the
/// initial connection cannot be established.
pub async fn build_redis_pool(url: &str) -> Result<RedisPool, redis::RedisError> {
    let manager = RedisConnectionManager::new(url)?;
    bb8::Pool::builder().build(manager).await
}

//! Redis-backed delivery queue triad.
//!
//! Three keys share the JSON task payload: the ready list
//! `webhook:queue` (LPUSH/BRPOP), the delayed sorted set
//! `webhook:delayed` scored by due unix seconds, and the dead letter
//! list `webhook:dlq`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::DeliveryTask;
use crate::domain::ports::{DeliveryQueue, DeliveryQueueError};
use crate::outbound::RedisPool;

const READY_KEY: &str = "webhook:queue";
const DELAYED_KEY: &str = "webhook:delayed";
const DLQ_KEY: &str = "webhook:dlq";

const PROMOTE_BATCH: usize = 100;
const REQUEUE_PENALTY_SECS: i64 = 5;
/// BRPOP is bounded so a cancelled dequeue never abandons a pooled
/// connection with a reply still in flight.
const DEQUEUE_POLL_SECS: f64 = 1.0;

/// Redis implementation of the delivery queue port.
#[derive(Clone)]
pub struct RedisDeliveryQueue {
    pool: RedisPool,
}

impl RedisDeliveryQueue {
    /// Create a new queue over the given connection pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

fn map_redis_error(error: redis::RedisError) -> DeliveryQueueError {
    DeliveryQueueError::backend(error.to_string())
}

fn map_pool_error(error: bb8::RunError<redis::RedisError>) -> DeliveryQueueError {
    DeliveryQueueError::backend(error.to_string())
}

fn encode_task(task: &DeliveryTask) -> Result<Vec<u8>, DeliveryQueueError> {
    serde_json::to_vec(task)
        .map_err(|encode_error| DeliveryQueueError::serialization(encode_error.to_string()))
}

fn decode_task(payload: &[u8]) -> Result<DeliveryTask, DeliveryQueueError> {
    serde_json::from_slice(payload)
        .map_err(|decode_error| DeliveryQueueError::serialization(decode_error.to_string()))
}

#[async_trait]
impl DeliveryQueue for RedisDeliveryQueue {
    async fn enqueue(&self, task: &DeliveryTask) -> Result<(), DeliveryQueueError> {
        let payload = encode_task(task)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.lpush::<_, _, ()>(READY_KEY, payload)
            .await
            .map_err(map_redis_error)
    }

    async fn dequeue(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<DeliveryTask>, DeliveryQueueError> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(None);
            }

            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let popped: Option<(String, Vec<u8>)> = conn
                .brpop(READY_KEY, DEQUEUE_POLL_SECS)
                .await
                .map_err(map_redis_error)?;

            if let Some((_, payload)) = popped {
                return decode_task(&payload).map(Some);
            }
        }
    }

    async fn enqueue_with_delay(
        &self,
        task: &DeliveryTask,
        delay: Duration,
    ) -> Result<(), DeliveryQueueError> {
        let payload = encode_task(task)?;
        let due = Utc::now().timestamp() + i64::try_from(delay.as_secs()).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.zadd::<_, _, _, ()>(DELAYED_KEY, payload, due)
            .await
            .map_err(map_redis_error)
    }

    async fn promote_due(&self) -> Result<usize, DeliveryQueueError> {
        let now = Utc::now().timestamp();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let due: Vec<Vec<u8>> = redis::cmd("ZRANGEBYSCORE")
            .arg(DELAYED_KEY)
            .arg(0)
            .arg(now)
            .arg("LIMIT")
            .arg(0)
            .arg(PROMOTE_BATCH)
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;

        let mut promoted = 0;
        for payload in due {
            // Another promoter may have claimed this member between the
            // range read and the removal; ZREM returning 0 means it is
            // already gone and must not be pushed twice.
            let removed: i64 = match conn.zrem(DELAYED_KEY, payload.as_slice()).await {
                Ok(removed) => removed,
                Err(remove_error) => {
                    warn!(error = %remove_error, "failed to claim delayed task");
                    continue;
                }
            };
            if removed == 0 {
                continue;
            }

            if let Err(push_error) = conn.lpush::<_, _, ()>(READY_KEY, payload.as_slice()).await {
                warn!(error = %push_error, "failed to promote delayed task, re-delaying");
                let penalty = now + REQUEUE_PENALTY_SECS;
                if let Err(redelay_error) = conn
                    .zadd::<_, _, _, ()>(DELAYED_KEY, payload.as_slice(), penalty)
                    .await
                {
                    warn!(error = %redelay_error, "failed to re-delay task");
                }
                continue;
            }
            promoted += 1;
        }
        Ok(promoted)
    }

    async fn enqueue_dlq(&self, task: &DeliveryTask) -> Result<(), DeliveryQueueError> {
        let payload = encode_task(task)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.lpush::<_, _, ()>(DLQ_KEY, payload)
            .await
            .map_err(map_redis_error)
    }
}

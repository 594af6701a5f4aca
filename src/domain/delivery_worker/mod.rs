//! Webhook delivery worker: a dispatcher draining the ready queue and a
//! promoter moving due delayed tasks back into it.
//!
//! Failure routing per task: retryable faults (transport, 5xx, 429) earn
//! exponentially backed-off retries up to [`MAX_RETRIES`] total tries;
//! everything else, and any exhausted task, lands in the dead letter
//! queue with `last_error` set.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::DeliveryTask;
use crate::domain::ports::{DeliveryQueue, WebhookSink, WebhookSinkError};

/// Total delivery tries per task, the first included.
pub const MAX_RETRIES: u32 = 3;

const BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const PROMOTE_INTERVAL: Duration = Duration::from_secs(1);
const DEQUEUE_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Long-running delivery engine over the queue and sink ports.
pub struct DeliveryWorker {
    queue: Arc<dyn DeliveryQueue>,
    sink: Arc<dyn WebhookSink>,
}

/// Join handle pair returned by [`DeliveryWorker::start`].
///
/// Both activities exit once the cancellation token fires; awaiting
/// [`DeliveryWorkerHandle::join`] is the observable completion signal.
pub struct DeliveryWorkerHandle {
    promoter: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl DeliveryWorkerHandle {
    /// Wait for both worker activities to finish.
    pub async fn join(self) {
        let _ = self.promoter.await;
        let _ = self.dispatcher.await;
    }
}

impl DeliveryWorker {
    pub fn new(queue: Arc<dyn DeliveryQueue>, sink: Arc<dyn WebhookSink>) -> Self {
        Self { queue, sink }
    }

    /// Spawn the promoter and dispatcher and return promptly.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> DeliveryWorkerHandle {
        info!("delivery worker started");

        let promoter = tokio::spawn({
            let worker = Arc::clone(&self);
            let shutdown = shutdown.clone();
            async move { worker.run_promoter(shutdown).await }
        });
        let dispatcher = tokio::spawn(async move { self.run_dispatcher(shutdown).await });

        DeliveryWorkerHandle {
            promoter,
            dispatcher,
        }
    }

    async fn run_promoter(&self, shutdown: CancellationToken) {
        let mut tick = tokio::time::interval(PROMOTE_INTERVAL);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = tick.tick() => {
                    if let Err(queue_error) = self.queue.promote_due().await {
                        error!(error = %queue_error, "failed to promote delayed tasks");
                    }
                }
            }
        }
    }

    async fn run_dispatcher(&self, shutdown: CancellationToken) {
        loop {
            match self.queue.dequeue(&shutdown).await {
                Ok(None) => {
                    info!("delivery worker stopping");
                    break;
                }
                Ok(Some(task)) => self.process(task).await,
                Err(queue_error) => {
                    error!(error = %queue_error, "failed to dequeue delivery task");
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(DEQUEUE_ERROR_PAUSE) => {}
                    }
                }
            }
        }
    }

    async fn process(&self, task: DeliveryTask) {
        if task.attempt > 0 {
            info!(
                attempt = task.attempt,
                user_id = %task.check.user_id,
                "retrying webhook delivery"
            );
        }

        match self.sink.deliver(&task.check).await {
            Ok(()) => info!(
                user_id = %task.check.user_id,
                check_id = task.check.id,
                "webhook delivered"
            ),
            Err(sink_error) => self.handle_failure(task, sink_error).await,
        }
    }

    async fn handle_failure(&self, mut task: DeliveryTask, sink_error: WebhookSinkError) {
        task.attempt += 1;
        task.last_error = Some(sink_error.to_string());

        if sink_error.is_retryable() && task.attempt < MAX_RETRIES {
            let backoff = retry_backoff(task.attempt);
            match self.queue.enqueue_with_delay(&task, backoff).await {
                Ok(()) => info!(
                    user_id = %task.check.user_id,
                    attempt = task.attempt,
                    delay_secs = backoff.as_secs(),
                    "webhook delivery scheduled for retry"
                ),
                Err(queue_error) => {
                    error!(
                        user_id = %task.check.user_id,
                        attempt = task.attempt,
                        error = %queue_error,
                        "failed to schedule retry"
                    );
                    self.send_to_dlq(task).await;
                }
            }
        } else {
            self.send_to_dlq(task).await;
        }
    }

    async fn send_to_dlq(&self, task: DeliveryTask) {
        match self.queue.enqueue_dlq(&task).await {
            Ok(()) => warn!(
                user_id = %task.check.user_id,
                check_id = task.check.id,
                final_attempt = task.attempt,
                last_error = task.last_error.as_deref().unwrap_or_default(),
                "delivery task moved to dead letter queue"
            ),
            Err(queue_error) => error!(
                user_id = %task.check.user_id,
                error = %queue_error,
                "failed to move task to dead letter queue"
            ),
        }
    }
}

/// Exponential backoff for the given failed-attempt count, clamped.
fn retry_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let secs = BASE_DELAY
        .as_secs()
        .saturating_mul(2_u64.saturating_pow(exponent));
    Duration::from_secs(secs).min(MAX_BACKOFF)
}

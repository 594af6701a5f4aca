//! Driven port for the webhook delivery queue triad.
//!
//! Three logical queues share one payload schema (the JSON-encoded
//! [`DeliveryTask`]): a ready FIFO, a delayed priority queue keyed by
//! due time, and a dead letter FIFO nobody in the core consumes.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::DeliveryTask;

/// Errors raised by the queue adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryQueueError {
    /// Queue backend is unavailable or a command failed.
    #[error("delivery queue backend failure: {message}")]
    Backend { message: String },
    /// A task payload could not be encoded or decoded.
    #[error("delivery task serialisation failed: {message}")]
    Serialization { message: String },
}

impl DeliveryQueueError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Port over the ready/delayed/DLQ triad.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    /// Push a task at the head of the ready queue.
    async fn enqueue(&self, task: &DeliveryTask) -> Result<(), DeliveryQueueError>;

    /// Pop from the tail of the ready queue, blocking until a task
    /// arrives or `shutdown` is cancelled. Cancellation yields
    /// `Ok(None)`; a task is never silently dropped on this path.
    async fn dequeue(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<DeliveryTask>, DeliveryQueueError>;

    /// Schedule a task to become ready after `delay`.
    async fn enqueue_with_delay(
        &self,
        task: &DeliveryTask,
        delay: Duration,
    ) -> Result<(), DeliveryQueueError>;

    /// Move tasks whose due time has passed onto the ready queue, oldest
    /// due first, at most 100 per call. A task whose ready push fails is
    /// re-inserted with a 5-second penalty rather than lost. Returns the
    /// number promoted; calling again immediately re-moves nothing.
    async fn promote_due(&self) -> Result<usize, DeliveryQueueError>;

    /// Append a task to the dead letter queue.
    async fn enqueue_dlq(&self, task: &DeliveryTask) -> Result<(), DeliveryQueueError>;
}

const PROMOTE_BATCH: usize = 100;

#[derive(Default)]
struct InMemoryState {
    ready: VecDeque<DeliveryTask>,
    delayed: Vec<(Instant, DeliveryTask)>,
    dlq: Vec<DeliveryTask>,
}

/// In-process queue triad honouring the same contract as the Redis
/// adapter. Worker tests run against it under tokio's paused clock, so
/// due times use [`tokio::time::Instant`].
#[derive(Default)]
pub struct InMemoryDeliveryQueue {
    state: Mutex<InMemoryState>,
    ready_signal: Notify,
}

impl InMemoryDeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently ready.
    pub fn ready_depth(&self) -> usize {
        self.lock_state().ready.len()
    }

    /// Number of tasks currently waiting on a due time.
    pub fn delayed_depth(&self) -> usize {
        self.lock_state().delayed.len()
    }

    /// Snapshot of the dead letter queue, oldest first.
    pub fn dlq_tasks(&self) -> Vec<DeliveryTask> {
        self.lock_state().dlq.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl DeliveryQueue for InMemoryDeliveryQueue {
    async fn enqueue(&self, task: &DeliveryTask) -> Result<(), DeliveryQueueError> {
        self.lock_state().ready.push_front(task.clone());
        self.ready_signal.notify_one();
        Ok(())
    }

    async fn dequeue(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Option<DeliveryTask>, DeliveryQueueError> {
        loop {
            if let Some(task) = self.lock_state().ready.pop_back() {
                return Ok(Some(task));
            }
            tokio::select! {
                () = shutdown.cancelled() => return Ok(None),
                () = self.ready_signal.notified() => {}
            }
        }
    }

    async fn enqueue_with_delay(
        &self,
        task: &DeliveryTask,
        delay: Duration,
    ) -> Result<(), DeliveryQueueError> {
        self.lock_state()
            .delayed
            .push((Instant::now() + delay, task.clone()));
        Ok(())
    }

    async fn promote_due(&self) -> Result<usize, DeliveryQueueError> {
        let now = Instant::now();
        let mut state = self.lock_state();

        let due: Vec<usize> = state
            .delayed
            .iter()
            .enumerate()
            .filter(|(_, (at, _))| *at <= now)
            .map(|(index, _)| index)
            .take(PROMOTE_BATCH)
            .collect();
        // Remove back-to-front so earlier indices stay valid, then push
        // in due-time order so the oldest due task dequeues first.
        let mut promoted = Vec::with_capacity(due.len());
        for index in due.into_iter().rev() {
            promoted.push(state.delayed.remove(index));
        }
        promoted.sort_by_key(|(at, _)| *at);
        let count = promoted.len();
        for (_, task) in promoted {
            state.ready.push_front(task);
            self.ready_signal.notify_one();
        }
        Ok(count)
    }

    async fn enqueue_dlq(&self, task: &DeliveryTask) -> Result<(), DeliveryQueueError> {
        self.lock_state().dlq.push(task.clone());
        Ok(())
    }
}

//! End-to-end pipeline tests over in-memory doubles: check service →
//! delivery queue → delivery worker → webhook sink.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use zonewatch::domain::ports::{
    CheckRepository, CheckRepositoryError, InMemoryDeliveryQueue, WebhookSink, WebhookSinkError,
};
use zonewatch::domain::{
    CheckCoordinatesRequest, CheckService, DeliveryWorker, LocationCheck, ZoneStat,
};

/// Check repository double deciding from a fixed nearest-zone answer.
struct FakeCheckRepository {
    nearest_id: Option<i32>,
    next_id: AtomicI32,
}

impl FakeCheckRepository {
    fn new(nearest_id: Option<i32>) -> Self {
        Self {
            nearest_id,
            next_id: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl CheckRepository for FakeCheckRepository {
    async fn record_check(
        &self,
        user_id: &str,
        lat: f64,
        long: f64,
    ) -> Result<LocationCheck, CheckRepositoryError> {
        Ok(LocationCheck {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: user_id.to_owned(),
            lat,
            long,
            in_danger_zone: self.nearest_id.is_some(),
            nearest_id: self.nearest_id,
            checked_at: Utc::now(),
        })
    }

    async fn aggregate_by_zone(
        &self,
        _window_minutes: i64,
    ) -> Result<Vec<ZoneStat>, CheckRepositoryError> {
        Ok(Vec::new())
    }
}

/// Webhook sink double answering from a script and recording payloads.
struct ScriptedSink {
    responses: Mutex<VecDeque<Result<(), WebhookSinkError>>>,
    deliveries: Mutex<Vec<LocationCheck>>,
}

impl ScriptedSink {
    fn new(responses: Vec<Result<(), WebhookSinkError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            deliveries: Mutex::new(Vec::new()),
        })
    }

    fn deliveries(&self) -> Vec<LocationCheck> {
        self.deliveries.lock().expect("deliveries mutex").clone()
    }
}

#[async_trait]
impl WebhookSink for ScriptedSink {
    async fn deliver(&self, check: &LocationCheck) -> Result<(), WebhookSinkError> {
        self.deliveries
            .lock()
            .expect("deliveries mutex")
            .push(check.clone());
        self.responses
            .lock()
            .expect("responses mutex")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

async fn wait_until(description: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(120);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting: {description}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn in_zone_check_reaches_the_webhook_and_queues_drain() {
    let queue = Arc::new(InMemoryDeliveryQueue::new());
    let sink = ScriptedSink::new(vec![Ok(())]);
    let service = CheckService::new(Arc::new(FakeCheckRepository::new(Some(7))), queue.clone());

    let check = service
        .check_coordinates(CheckCoordinatesRequest {
            user_id: "user-1".to_owned(),
            lat: 50.0,
            long: 50.0,
        })
        .await
        .expect("check succeeds");
    assert!(check.in_danger_zone);
    assert_eq!(check.nearest_id, Some(7));
    assert_eq!(queue.ready_depth(), 1);

    let worker = Arc::new(DeliveryWorker::new(queue.clone(), sink.clone()));
    let shutdown = CancellationToken::new();
    let handle = worker.start(shutdown.clone());

    wait_until("one delivery", || !sink.deliveries().is_empty()).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0], check, "the webhook body is the recorded check");
    assert_eq!(queue.ready_depth(), 0);
    assert_eq!(queue.delayed_depth(), 0);
    assert!(queue.dlq_tasks().is_empty());

    shutdown.cancel();
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn out_of_zone_check_enqueues_nothing() {
    let queue = Arc::new(InMemoryDeliveryQueue::new());
    let service = CheckService::new(Arc::new(FakeCheckRepository::new(None)), queue.clone());

    let check = service
        .check_coordinates(CheckCoordinatesRequest {
            user_id: "user-1".to_owned(),
            lat: 50.0,
            long: 50.0,
        })
        .await
        .expect("check succeeds");

    assert!(!check.in_danger_zone);
    assert_eq!(check.nearest_id, None);
    assert_eq!(queue.ready_depth(), 0);
    assert_eq!(queue.delayed_depth(), 0);
}

#[tokio::test(start_paused = true)]
async fn two_checks_from_one_user_deliver_two_webhooks() {
    let queue = Arc::new(InMemoryDeliveryQueue::new());
    let sink = ScriptedSink::new(vec![Ok(()), Ok(())]);
    let service = CheckService::new(Arc::new(FakeCheckRepository::new(Some(3))), queue.clone());

    for _ in 0..2 {
        service
            .check_coordinates(CheckCoordinatesRequest {
                user_id: "user-1".to_owned(),
                lat: 50.0,
                long: 50.0,
            })
            .await
            .expect("check succeeds");
    }

    let worker = Arc::new(DeliveryWorker::new(queue.clone(), sink.clone()));
    let shutdown = CancellationToken::new();
    let handle = worker.start(shutdown.clone());

    wait_until("two deliveries", || sink.deliveries().len() == 2).await;
    assert!(queue.dlq_tasks().is_empty());

    shutdown.cancel();
    handle.join().await;
}

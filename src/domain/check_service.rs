//! Location check pipeline: validate, decide-and-record, hand off to
//! the delivery queue.
//!
//! The decision and its audit row are durable before any notification
//! work starts; a failed enqueue is logged and swallowed so the caller
//! still receives the committed check.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::ports::{CheckRepository, CheckRepositoryError, DeliveryQueue};
use crate::domain::{DeliveryTask, Error, LocationCheck, ZoneStat, validate_coordinates};

/// Raw input for one coordinate check.
#[derive(Debug, Clone)]
pub struct CheckCoordinatesRequest {
    pub user_id: String,
    pub lat: f64,
    pub long: f64,
}

/// Orchestrates the check pipeline and the stats query.
pub struct CheckService {
    checks: Arc<dyn CheckRepository>,
    queue: Arc<dyn DeliveryQueue>,
}

impl CheckService {
    pub fn new(checks: Arc<dyn CheckRepository>, queue: Arc<dyn DeliveryQueue>) -> Self {
        Self { checks, queue }
    }

    /// Validate the coordinates, record the nearest-zone decision, and
    /// enqueue a delivery task when the user is inside a zone.
    pub async fn check_coordinates(
        &self,
        request: CheckCoordinatesRequest,
    ) -> Result<LocationCheck, Error> {
        validate_coordinates(request.lat, request.long)
            .map_err(|validation_error| Error::invalid_validation(validation_error.to_string()))?;

        info!(user_id = %request.user_id, "checking coordinates");
        let check = self
            .checks
            .record_check(&request.user_id, request.lat, request.long)
            .await
            .map_err(map_repository_error)?;

        if check.in_danger_zone {
            self.enqueue_notification(&check).await;
        }

        info!(
            user_id = %check.user_id,
            check_id = check.id,
            in_danger_zone = check.in_danger_zone,
            "coordinates checked"
        );
        Ok(check)
    }

    /// Distinct in-danger users per zone over the trailing window.
    pub async fn get_stats(&self, window_minutes: i64) -> Result<Vec<ZoneStat>, Error> {
        self.checks
            .aggregate_by_zone(window_minutes)
            .await
            .map_err(map_repository_error)
    }

    /// Best-effort handoff: the check row is already committed, so an
    /// enqueue failure must not fail the request.
    async fn enqueue_notification(&self, check: &LocationCheck) {
        let task = DeliveryTask::new(check.clone());
        if let Err(queue_error) = self.queue.enqueue(&task).await {
            error!(
                user_id = %check.user_id,
                check_id = check.id,
                error = %queue_error,
                "failed to enqueue webhook delivery"
            );
        }
    }
}

fn map_repository_error(repository_error: CheckRepositoryError) -> Error {
    match repository_error {
        CheckRepositoryError::Connection { message } => Error::service_unavailable(message),
        CheckRepositoryError::Query { message } => Error::internal(message),
    }
}

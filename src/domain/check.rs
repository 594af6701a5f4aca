//! Location check records and the webhook delivery envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One nearest-zone decision, persisted for every inbound check.
///
/// Invariant: `in_danger_zone` is true exactly when `nearest_id` is set.
/// The store derives both together inside one transaction, so readers
/// never observe a half-written decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LocationCheck {
    pub id: i32,
    pub user_id: String,
    pub lat: f64,
    pub long: f64,
    pub in_danger_zone: bool,
    pub nearest_id: Option<i32>,
    pub checked_at: DateTime<Utc>,
}

/// Distinct users observed inside one zone over the stats window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ZoneStat {
    pub zone_id: i32,
    pub user_count: i64,
}

/// Unit of work carried through the delivery queue triad.
///
/// `attempt` counts failed deliveries so far; a task enters the dead
/// letter queue carrying the number of tries actually made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTask {
    #[serde(rename = "location_check")]
    pub check: LocationCheck,
    pub attempt: u32,
    #[serde(rename = "first_attempt")]
    pub first_attempt_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl DeliveryTask {
    /// Wrap a fresh in-zone check for its first delivery attempt.
    pub fn new(check: LocationCheck) -> Self {
        Self {
            check,
            attempt: 0,
            first_attempt_at: Utc::now(),
            last_error: None,
        }
    }
}

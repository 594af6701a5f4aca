//! Location check and stats handlers.
//!
//! ```text
//! POST /api/v1/location/check
//! GET  /api/v1/incidents/stats
//! ```
//!
//! Neither route requires the API key.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{CheckCoordinatesRequest, LocationCheck, ZoneStat};
use crate::inbound::http::error::{ApiResult, ErrorEnvelope};
use crate::inbound::http::state::HttpState;

/// Coordinates payload for one check.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckJson {
    pub user_id: String,
    pub lat: f64,
    pub long: f64,
}

/// Stats response envelope.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub stats: Vec<ZoneStat>,
}

/// Decide whether the user stands inside any active zone.
#[utoipa::path(
    post,
    path = "/api/v1/location/check",
    request_body = CheckJson,
    responses(
        (status = 200, description = "The recorded decision", body = LocationCheck),
        (status = 400, description = "Invalid payload", body = ErrorEnvelope)
    ),
    tags = ["location"],
    operation_id = "checkLocation",
    security([])
)]
#[post("/location/check")]
pub async fn check_location(
    state: web::Data<HttpState>,
    payload: web::Json<CheckJson>,
) -> ApiResult<web::Json<LocationCheck>> {
    let payload = payload.into_inner();
    let check = state
        .checks
        .check_coordinates(CheckCoordinatesRequest {
            user_id: payload.user_id,
            lat: payload.lat,
            long: payload.long,
        })
        .await?;
    Ok(web::Json(check))
}

/// Distinct users seen inside each zone over the configured window.
#[utoipa::path(
    get,
    path = "/api/v1/incidents/stats",
    responses(
        (status = 200, description = "Per-zone distinct user counts", body = StatsResponse),
        (status = 500, description = "Aggregation failed", body = ErrorEnvelope)
    ),
    tags = ["incidents"],
    operation_id = "incidentStats",
    security([])
)]
#[get("/incidents/stats")]
pub async fn zone_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let stats = state.checks.get_stats(state.stats_window_mins).await?;
    Ok(web::Json(StatsResponse { stats }))
}

#[cfg(test)]
mod tests;

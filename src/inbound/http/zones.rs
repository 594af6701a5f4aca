//! Zone management handlers.
//!
//! ```text
//! POST   /api/v1/incidents
//! GET    /api/v1/incidents?limit=&page=
//! GET    /api/v1/incidents/{id}
//! PUT    /api/v1/incidents/{id}
//! DELETE /api/v1/incidents/{id}
//! ```
//!
//! All routes here sit behind the `X-API-Key` guard.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::{UpsertZoneRequest, Zone, ZonePage};
use crate::inbound::http::error::{ApiResult, ErrorEnvelope};
use crate::inbound::http::state::HttpState;

/// Zone payload for create and full update.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ZoneJson {
    pub title: String,
    pub description: Option<String>,
    pub lat: f64,
    pub long: f64,
    pub radius_m: i32,
    pub active: Option<bool>,
}

impl From<ZoneJson> for UpsertZoneRequest {
    fn from(payload: ZoneJson) -> Self {
        Self {
            title: payload.title,
            description: payload.description,
            lat: payload.lat,
            long: payload.long,
            radius_m: payload.radius_m,
            active: payload.active,
        }
    }
}

/// Pagination query parameters, parsed by the service layer.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// Create a zone.
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    request_body = ZoneJson,
    responses(
        (status = 201, description = "Zone created", body = Zone),
        (status = 400, description = "Invalid payload", body = ErrorEnvelope),
        (status = 401, description = "Missing or bad API key", body = ErrorEnvelope),
        (status = 409, description = "Duplicate title", body = ErrorEnvelope)
    ),
    tags = ["incidents"],
    operation_id = "createIncident",
    security(("ApiKey" = []))
)]
#[post("")]
pub async fn create_zone(
    state: web::Data<HttpState>,
    payload: web::Json<ZoneJson>,
) -> ApiResult<HttpResponse> {
    let zone = state.zones.create(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(zone))
}

/// List zones newest-first.
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of zones", body = ZonePage),
        (status = 400, description = "Bad pagination parameters", body = ErrorEnvelope),
        (status = 401, description = "Missing or bad API key", body = ErrorEnvelope)
    ),
    tags = ["incidents"],
    operation_id = "listIncidents",
    security(("ApiKey" = []))
)]
#[get("")]
pub async fn list_zones(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ZonePage>> {
    let page = state
        .zones
        .paginate(query.limit.as_deref(), query.page.as_deref())
        .await?;
    Ok(web::Json(page))
}

/// Fetch one zone.
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{id}",
    params(("id" = String, Path, description = "Zone id")),
    responses(
        (status = 200, description = "The zone", body = Zone),
        (status = 400, description = "Bad id", body = ErrorEnvelope),
        (status = 401, description = "Missing or bad API key", body = ErrorEnvelope),
        (status = 404, description = "Unknown zone", body = ErrorEnvelope)
    ),
    tags = ["incidents"],
    operation_id = "getIncident",
    security(("ApiKey" = []))
)]
#[get("/{id}")]
pub async fn get_zone(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Zone>> {
    let zone = state.zones.get_by_id(&path.into_inner()).await?;
    Ok(web::Json(zone))
}

/// Overwrite one zone.
#[utoipa::path(
    put,
    path = "/api/v1/incidents/{id}",
    params(("id" = String, Path, description = "Zone id")),
    request_body = ZoneJson,
    responses(
        (status = 200, description = "The updated zone", body = Zone),
        (status = 400, description = "Invalid payload or id", body = ErrorEnvelope),
        (status = 401, description = "Missing or bad API key", body = ErrorEnvelope),
        (status = 404, description = "Unknown zone", body = ErrorEnvelope)
    ),
    tags = ["incidents"],
    operation_id = "updateIncident",
    security(("ApiKey" = []))
)]
#[put("/{id}")]
pub async fn update_zone(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ZoneJson>,
) -> ApiResult<web::Json<Zone>> {
    let zone = state
        .zones
        .full_update(&path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(zone))
}

/// Delete one zone.
#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{id}",
    params(("id" = String, Path, description = "Zone id")),
    responses(
        (status = 200, description = "Zone deleted"),
        (status = 400, description = "Bad id", body = ErrorEnvelope),
        (status = 401, description = "Missing or bad API key", body = ErrorEnvelope),
        (status = 404, description = "Unknown zone", body = ErrorEnvelope)
    ),
    tags = ["incidents"],
    operation_id = "deleteIncident",
    security(("ApiKey" = []))
)]
#[delete("/{id}")]
pub async fn delete_zone(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.zones.delete(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

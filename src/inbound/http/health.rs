//! Service health endpoint.

use actix_web::{HttpResponse, get};

/// Liveness check for orchestration and load balancers.
#[utoipa::path(
    get,
    path = "/api/v1/system/health",
    responses((status = 200, description = "Service is alive")),
    tags = ["system"],
    operation_id = "health",
    security([])
)]
#[get("/system/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}

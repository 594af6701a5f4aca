//! Demo webhook receiver for manual end-to-end runs.
//!
//! Logs every delivered check and answers 200 so the delivery worker
//! treats the POST as a success.

use actix_web::{App, HttpResponse, HttpServer, post, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use zonewatch::domain::LocationCheck;

const BIND_ADDR: (&str, u16) = ("0.0.0.0", 9090);

#[post("/webhook")]
async fn receive(check: web::Json<LocationCheck>) -> HttpResponse {
    let check = check.into_inner();
    info!(
        check_id = check.id,
        user_id = %check.user_id,
        in_danger_zone = check.in_danger_zone,
        nearest_id = ?check.nearest_id,
        lat = check.lat,
        long = check.long,
        "received webhook"
    );
    HttpResponse::Ok().json(serde_json::json!({ "message": "webhook received" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(init_error) = fmt().with_env_filter(filter).try_init() {
        warn!(error = %init_error, "tracing init failed");
    }

    info!(addr = %format!("{}:{}", BIND_ADDR.0, BIND_ADDR.1), "webhook echo starting");
    HttpServer::new(|| App::new().service(receive))
        .bind(BIND_ADDR)?
        .run()
        .await
}

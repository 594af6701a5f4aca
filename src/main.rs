//! API server entry point: configuration, migrations, worker spawn, and
//! graceful shutdown.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use zonewatch::config::{AppConfig, Mode};
use zonewatch::domain::{CheckService, DeliveryWorker, ZoneService};
use zonewatch::inbound::http::HttpState;
use zonewatch::outbound::persistence::run_migrations;
use zonewatch::outbound::{
    DbPool, DieselCheckRepository, DieselZoneRepository, PoolConfig, RedisDeliveryQueue,
    RedisZoneCache, ReqwestWebhookSink, build_redis_pool,
};
use zonewatch::server::create_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    init_tracing(config.mode);

    let pool = DbPool::new(PoolConfig::new(config.database.url()))
        .await
        .map_err(std::io::Error::other)?;
    run_migrations(&pool).await.map_err(std::io::Error::other)?;

    let redis = build_redis_pool(&config.redis.url())
        .await
        .map_err(std::io::Error::other)?;

    let queue = Arc::new(RedisDeliveryQueue::new(redis.clone()));
    let sink = Arc::new(
        ReqwestWebhookSink::new(
            config.webhook.url.clone(),
            config.webhook.insecure_skip_verify,
        )
        .map_err(std::io::Error::other)?,
    );

    let zone_service = Arc::new(ZoneService::new(
        Arc::new(DieselZoneRepository::new(pool.clone())),
        Arc::new(RedisZoneCache::new(redis)),
    ));
    let check_service = Arc::new(CheckService::new(
        Arc::new(DieselCheckRepository::new(pool)),
        queue.clone(),
    ));
    let state = HttpState::new(zone_service, check_service, config.stats_window_mins);

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let worker = Arc::new(DeliveryWorker::new(queue, sink));
    let worker_handle = worker.start(shutdown.clone());

    let bind_addr = ([0, 0, 0, 0], config.port).into();
    let server = create_server(state, config.api_key.clone(), bind_addr)?;
    let server_handle = server.handle();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            server_handle.stop(true).await;
        }
    });

    info!(
        port = config.port,
        webhook_url = %config.webhook.url,
        "zonewatch started"
    );

    let result = server.await;

    // Reached on signal-driven stop and on server failure alike; either
    // way the worker must wind down before the process exits.
    shutdown.cancel();
    worker_handle.join().await;
    info!("shutdown complete");
    result
}

fn init_tracing(mode: Mode) {
    let default_directive = match mode {
        Mode::Debug => "debug",
        Mode::Release => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let init_result = match mode {
        Mode::Release => fmt().with_env_filter(filter).json().try_init(),
        Mode::Debug => fmt().with_env_filter(filter).try_init(),
    };
    if let Err(init_error) = init_result {
        warn!(error = %init_error, "tracing init failed");
    }
}

fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(signal_error) => {
            warn!(error = %signal_error, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

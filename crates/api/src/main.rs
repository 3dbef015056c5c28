use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use hostwatch_api::app::{create_app, AppState, Stores};
use hostwatch_api::config::{Config, StorageBackend};
use hostwatch_api::jobs::{
    spawn_alert_worker, HistoryRecordJob, HistoryRetentionJob, HostPollJob, JobScheduler,
    PoolMetricsJob,
};
use hostwatch_api::middleware::{init_metrics, logging::init_logging};
use hostwatch_api::services::{bootstrap_master, HttpStatusSource};
use persistence::repositories::{DeviceRepository, HistoryRepository, UserRepository};

/// Upper bound for background jobs to finish after the server stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging);
    init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Hostwatch v{}", env!("CARGO_PKG_VERSION"));

    let mut scheduler = JobScheduler::new();

    let stores = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            scheduler.register(PoolMetricsJob::new(pool.clone()));

            Stores {
                devices: Arc::new(DeviceRepository::new(pool.clone())),
                history: Arc::new(HistoryRepository::new(pool.clone())),
                users: Arc::new(UserRepository::new(pool)),
            }
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Stores::in_memory()
        }
    };

    bootstrap_master(stores.users.as_ref(), &config.auth).await?;

    let status_source = Arc::new(HttpStatusSource::new(&config.status_source)?);
    let state = AppState::new(config.clone(), stores, status_source)?;

    scheduler.register(HostPollJob::new(
        state.registry.clone(),
        state.reconciler.clone(),
        Arc::clone(&state.snapshots),
        config.monitor.poll_interval_secs,
    ));
    if config.history.record {
        scheduler.register(HistoryRecordJob::new(
            Arc::clone(&state.snapshots),
            Arc::clone(&state.history),
            config.history.sample_interval_secs,
        ));
    }
    scheduler.register(HistoryRetentionJob::new(
        Arc::clone(&state.history),
        config.history.retention_days,
    ));

    let alert_worker = spawn_alert_worker(
        &state.snapshots,
        Arc::clone(&state.alerts),
        scheduler.shutdown_signal(),
    );
    scheduler.track(alert_worker);
    scheduler.start();

    let app = create_app(state);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(SHUTDOWN_GRACE).await;

    info!("Hostwatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use asset_manager_api::app::{create_app, AppState};
use asset_manager_api::config::Config;
use asset_manager_api::jobs::{
    JobScheduler, LoginLimiterCleanupJob, MaintenanceReminderJob, PoolMetricsJob,
};
use asset_manager_api::middleware::{init_metrics, logging::init_logging};
use asset_manager_api::services::{bootstrap_admin, ConsoleNotificationService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;
    init_metrics().context("failed to install metrics recorder")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hotel asset manager");

    let db_config = persistence::db::DatabaseConfig::from(&config.database);
    let pool = persistence::db::create_pool(&db_config)
        .await
        .context("failed to connect to the database")?;

    info!("Running database migrations");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await
        .context("database migration failed")?;

    let addr = config.socket_addr()?;
    let reminders = config.reminders.clone();
    let state = AppState::new(
        config,
        persistence::stores(pool.clone()),
        Arc::new(ConsoleNotificationService),
        Some(pool.clone()),
    )?;

    bootstrap_admin(&state.services.principals, &state.config.admin)
        .await
        .context("super-administrator bootstrap failed")?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    if state.login_limiter.is_enabled() {
        scheduler.register(LoginLimiterCleanupJob::new(state.login_limiter.clone()));
    }
    if reminders.enabled {
        scheduler.register(MaintenanceReminderJob::new(
            state.services.reminders.clone(),
            reminders.interval_minutes,
        ));
    } else {
        warn!("Maintenance reminders are disabled");
    }
    scheduler.start();

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

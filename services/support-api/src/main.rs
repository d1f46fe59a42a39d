use anyhow::Result;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use common::database::{close_pool, health_check, init_pool, run_migrations};
use support_api::{
    AppState, MIGRATOR, config::AppConfig, logging, notifications, notifications::Notifier,
    routes, storage::PhotoStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load_or_create(&AppConfig::path_from_env())?;

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = logging::init(&config.log_file_path)?;

    info!("Starting support API service");

    let pool = init_pool(&config.database()).await?;
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool, &MIGRATOR).await?;

    let photo_storage = PhotoStorage::new(&config.uploads_dir);
    photo_storage.init().await?;

    let (notifier, worker) = Notifier::channel(&config.notifications)?;
    let worker_handle = worker.spawn();

    let state = AppState::new(pool.clone(), photo_storage, notifier);
    let app = routes::create_router(state, &config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Support API listening on {}", addr);

    // The router owns the last Notifier clones; serve returning drops them,
    // which lets the worker finish the queue and exit.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    notifications::drain(
        worker_handle,
        Duration::from_secs(config.notifications.drain_timeout_secs),
    )
    .await;
    close_pool(&pool).await;

    info!("Support API stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

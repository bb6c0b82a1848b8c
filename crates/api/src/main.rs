use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attsync_api::background;
use attsync_api::config::ServerConfig;
use attsync_api::engine::store::{PgSyncStore, SyncStore};
use attsync_api::engine::sync::SyncEngine;
use attsync_api::engine::transfer::TransferEngine;
use attsync_api::router::build_app_router;
use attsync_api::state::AppState;
use attsync_device::{DeviceCapability, SessionLocks, ZkTecoCapability};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attsync_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = attsync_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    attsync_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    attsync_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Engines ---
    // One session-lock registry shared by both subsystems, so a machine
    // being synced can never be claimed by a transfer at the same time.
    let store: Arc<dyn SyncStore> = Arc::new(PgSyncStore::new(pool.clone()));
    let device: Arc<dyn DeviceCapability> = Arc::new(ZkTecoCapability::new(config.device_timeout));
    let locks = Arc::new(SessionLocks::new());

    let sync_engine = Arc::new(SyncEngine::new(
        Arc::clone(&store),
        Arc::clone(&device),
        Arc::clone(&locks),
        config.watermark_mode,
        config.sync_concurrency,
    ));
    let transfer_engine = Arc::new(TransferEngine::new(store, device, locks));

    // --- Poll scheduler ---
    let scheduler_cancel = CancellationToken::new();
    let scheduler_handle = tokio::spawn(background::device_sync::run(
        Arc::clone(&sync_engine),
        config.poll_policy.clone(),
        scheduler_cancel.clone(),
    ));
    tracing::info!("Device sync scheduler started");

    // --- App state and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        transfer_engine,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse().expect("Invalid HOST"), config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Drain background work ---
    scheduler_cancel.cancel();
    let _ = scheduler_handle.await;
    tracing::info!("Shutdown complete");
}

/// Resolve when the process receives a shutdown signal.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    tracing::info!("Shutdown signal received");
}

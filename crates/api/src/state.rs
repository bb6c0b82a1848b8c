use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::transfer::TransferEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// The sync engine is not here: it is owned by the background scheduler and
/// has no request-facing surface.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: attsync_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Transfer orchestrator backing the transfer and employee endpoints.
    pub transfer_engine: Arc<TransferEngine>,
}

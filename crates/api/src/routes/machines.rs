//! Route definitions for the machine registry views.

use axum::routing::get;
use axum::Router;

use crate::handlers::machines;
use crate::state::AppState;

/// ```text
/// GET /machines                  -> list_machines
/// GET /machines/{id}/sync-logs   -> list_sync_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/machines", get(machines::list_machines))
        .route("/machines/{id}/sync-logs", get(machines::list_sync_logs))
}

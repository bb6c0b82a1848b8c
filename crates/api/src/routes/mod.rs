pub mod employees;
pub mod health;
pub mod machines;
pub mod transfer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /employees                 POST  merged enrollment listing across terminals
/// /transfer                  POST  employee transfer between terminals
/// /machines                  GET   machine registry
/// /machines/{id}/sync-logs   GET   recent sync audit entries for a machine
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(employees::router())
        .merge(transfer::router())
        .merge(machines::router())
}

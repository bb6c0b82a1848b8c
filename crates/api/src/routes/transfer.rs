//! Route definitions for the transfer endpoint.

use axum::routing::post;
use axum::Router;

use crate::handlers::transfer;
use crate::state::AppState;

/// ```text
/// POST /transfer -> transfer_employees
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/transfer", post(transfer::transfer_employees))
}

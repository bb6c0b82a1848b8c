//! Route definitions for the employee listing endpoint.

use axum::routing::post;
use axum::Router;

use crate::handlers::employees;
use crate::state::AppState;

/// ```text
/// POST /employees -> list_employees
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/employees", post(employees::list_employees))
}

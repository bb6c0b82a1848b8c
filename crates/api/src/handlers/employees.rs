//! Handlers for the merged employee listing endpoint.

use axum::extract::State;
use axum::Json;
use attsync_device::EmployeeRecord;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the employee listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListEmployeesRequest {
    /// Terminal IPs to read. Unreachable terminals contribute nothing.
    pub addresses: Vec<String>,
}

/// POST /employees
///
/// Read the enrollment lists of the given terminals and return them
/// merged. Terminals that cannot be reached are skipped silently; the
/// response only ever contains what was actually readable.
pub async fn list_employees(
    State(state): State<AppState>,
    Json(input): Json<ListEmployeesRequest>,
) -> AppResult<Json<DataResponse<Vec<EmployeeRecord>>>> {
    if input.addresses.is_empty() {
        return Err(AppError::BadRequest(
            "addresses must not be empty".to_string(),
        ));
    }

    let employees = state.transfer_engine.list_employees(&input.addresses).await;
    Ok(Json(DataResponse { data: employees }))
}

//! Handlers for the employee transfer endpoint.

use axum::extract::State;
use axum::Json;
use attsync_core::transfer::TransferResult;
use attsync_device::EmployeeRecord;
use serde::Deserialize;

use crate::engine::transfer::TransferSpec;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the transfer endpoint.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub source_ip: String,
    /// Transfer every employee on the source instead of `employees`.
    #[serde(default)]
    pub transfer_all_employees: bool,
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    /// Target every other active machine instead of `destination_ips`.
    #[serde(default)]
    pub transfer_all_machines: bool,
    #[serde(default)]
    pub destination_ips: Vec<String>,
    pub user_id: String,
}

/// POST /transfer
///
/// Copy the selected enrollments from the source terminal to the selected
/// destinations. Partial failures do not fail the request: the result
/// carries the per-pair accounting and a message enumerating every
/// individual failure.
pub async fn transfer_employees(
    State(state): State<AppState>,
    Json(input): Json<TransferRequest>,
) -> AppResult<Json<DataResponse<TransferResult>>> {
    if input.source_ip.is_empty() {
        return Err(AppError::BadRequest("source_ip is required".to_string()));
    }
    if input.user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    if !input.transfer_all_employees && input.employees.is_empty() {
        return Err(AppError::BadRequest(
            "employees must not be empty unless transfer_all_employees is set".to_string(),
        ));
    }
    if !input.transfer_all_machines && input.destination_ips.is_empty() {
        return Err(AppError::BadRequest(
            "destination_ips must not be empty unless transfer_all_machines is set".to_string(),
        ));
    }

    let result = state
        .transfer_engine
        .transfer(TransferSpec {
            source_ip: input.source_ip,
            transfer_all_employees: input.transfer_all_employees,
            employees: input.employees,
            transfer_all_machines: input.transfer_all_machines,
            destination_ips: input.destination_ips,
            user_id: input.user_id,
        })
        .await?;

    Ok(Json(DataResponse { data: result }))
}

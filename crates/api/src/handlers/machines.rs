//! Read-only handlers over the machine registry and its audit trail.

use axum::extract::{Path, Query, State};
use axum::Json;
use attsync_core::error::CoreError;
use attsync_core::types::DbId;
use attsync_db::models::machine::Machine;
use attsync_db::models::sync_log::SyncLogEntry;
use attsync_db::repositories::{MachineRepo, SyncLogRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the sync log listing.
#[derive(Debug, Deserialize)]
pub struct SyncLogQuery {
    /// How many entries to return (default: 50, max: 500).
    pub limit: Option<i64>,
}

/// GET /machines
///
/// List the machine registry, active and inactive.
pub async fn list_machines(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Machine>>>> {
    let machines = MachineRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: machines }))
}

/// GET /machines/{id}/sync-logs
///
/// List the most recent sync audit entries for one machine.
pub async fn list_sync_logs(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
    Query(query): Query<SyncLogQuery>,
) -> AppResult<Json<DataResponse<Vec<SyncLogEntry>>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let machine = MachineRepo::find_by_id(&state.pool, machine_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id: machine_id,
        }))?;

    let logs = SyncLogRepo::list_for_machine(&state.pool, machine.id, limit).await?;
    Ok(Json(DataResponse { data: logs }))
}

//! Attendance machine registry models.

use attsync_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered attendance terminal.
///
/// Rows are maintained by administrative tooling; the sync engine only ever
/// reads them. `is_fetch_all` forces a full log re-read on every cycle
/// instead of the incremental watermark fetch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Machine {
    pub id: DbId,
    pub name: String,
    pub ip_address: String,
    pub port: i32,
    pub is_active: bool,
    pub is_fetch_all: bool,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub device_model: Option<String>,
    pub created_at: Timestamp,
    pub last_updated: Option<Timestamp>,
}

/// DTO for registering a new machine.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMachine {
    pub name: String,
    pub ip_address: String,
    pub port: i32,
    pub is_active: bool,
    pub is_fetch_all: bool,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub device_model: Option<String>,
}

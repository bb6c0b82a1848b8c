//! Punch record models.

use attsync_core::types::{DbId, DeviceTimestamp, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One attendance event harvested from a terminal. Immutable once created.
///
/// `punch_time` is the device's own clock reading and is only meaningful
/// relative to other punches from the same machine; `created_at` is set by
/// the database at insert time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PunchRecord {
    pub id: DbId,
    pub emp_no: String,
    pub punch_time: DeviceTimestamp,
    pub shift_in: bool,
    pub shift_out: bool,
    pub remarks: Option<String>,
    /// Work code reported alongside the log entry, when the terminal
    /// provides one.
    pub device_log_id: Option<i32>,
    pub created_at: Timestamp,
    pub machine_id: DbId,
    pub machine_ip: String,
    pub machine_port: i32,
}

/// DTO for inserting a harvested punch.
///
/// The owning machine id is supplied separately to the batch insert;
/// `created_at` is assigned by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePunchRecord {
    pub emp_no: String,
    pub punch_time: DeviceTimestamp,
    pub shift_in: bool,
    pub shift_out: bool,
    pub remarks: Option<String>,
    pub device_log_id: Option<i32>,
    pub machine_ip: String,
    pub machine_port: i32,
}

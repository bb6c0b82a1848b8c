//! Sync audit trail models.
//!
//! One row is written per machine per orchestration cycle, whatever the
//! outcome. Rows are append-only and have no update DTO.

use attsync_core::sync::SyncStatus;
use attsync_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One synchronization attempt against one machine.
///
/// `ended_at` is absent when the attempt aborted before completion, e.g. a
/// connection failure.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncLogEntry {
    pub id: DbId,
    pub machine_id: DbId,
    pub machine_ip: String,
    pub status: String,
    pub records_read: i32,
    pub message: String,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

/// DTO for appending a sync audit entry.
#[derive(Debug, Clone)]
pub struct CreateSyncLog {
    pub machine_id: DbId,
    pub machine_ip: String,
    pub status: SyncStatus,
    pub records_read: i32,
    pub message: String,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

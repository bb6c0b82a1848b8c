//! Repository for the append-only `machine_sync_logs` audit table.

use attsync_core::types::DbId;
use sqlx::PgPool;

use crate::models::sync_log::{CreateSyncLog, SyncLogEntry};

/// Column list for `machine_sync_logs` SELECT queries.
const COLUMNS: &str = "\
    id, machine_id, machine_ip, status, records_read, message, \
    started_at, ended_at";

/// Provides append and query operations for the sync audit trail.
pub struct SyncLogRepo;

impl SyncLogRepo {
    /// Append one audit entry.
    pub async fn insert(pool: &PgPool, entry: &CreateSyncLog) -> Result<SyncLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO machine_sync_logs \
             (machine_id, machine_ip, status, records_read, message, started_at, ended_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SyncLogEntry>(&query)
            .bind(entry.machine_id)
            .bind(&entry.machine_ip)
            .bind(entry.status.as_str())
            .bind(entry.records_read)
            .bind(&entry.message)
            .bind(entry.started_at)
            .bind(entry.ended_at)
            .fetch_one(pool)
            .await
    }

    /// List recent audit entries for a machine, newest first.
    pub async fn list_for_machine(
        pool: &PgPool,
        machine_id: DbId,
        limit: i64,
    ) -> Result<Vec<SyncLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM machine_sync_logs \
             WHERE machine_id = $1 ORDER BY started_at DESC, id DESC LIMIT $2"
        );
        sqlx::query_as::<_, SyncLogEntry>(&query)
            .bind(machine_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

//! Repository for the append-only `transfer_logs` table.

use sqlx::PgPool;

use crate::models::transfer::{CreateTransferLog, TransferLogEntry};

/// Column list for `transfer_logs` SELECT queries.
const COLUMNS: &str = "\
    id, emp_no, emp_name, source_ip, destination_ip, created_by, created_at";

/// Provides append and query operations for the transfer audit trail.
pub struct TransferRepo;

impl TransferRepo {
    /// Record one successful transfer.
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateTransferLog,
    ) -> Result<TransferLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO transfer_logs \
             (emp_no, emp_name, source_ip, destination_ip, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TransferLogEntry>(&query)
            .bind(&entry.emp_no)
            .bind(&entry.emp_name)
            .bind(&entry.source_ip)
            .bind(&entry.destination_ip)
            .bind(&entry.created_by)
            .fetch_one(pool)
            .await
    }

    /// List the most recent transfers, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<TransferLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfer_logs ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, TransferLogEntry>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

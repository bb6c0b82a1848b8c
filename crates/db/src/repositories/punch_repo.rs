//! Repository for the append-only `punch_records` table.

use attsync_core::types::{DbId, DeviceTimestamp};
use sqlx::PgPool;

use crate::models::punch::{CreatePunchRecord, PunchRecord};

/// Column list for `punch_records` SELECT queries.
const COLUMNS: &str = "\
    id, emp_no, punch_time, shift_in, shift_out, remarks, device_log_id, \
    created_at, machine_id, machine_ip, machine_port";

/// Number of bound parameters per row in the batch INSERT.
const INSERT_PARAMS: usize = 9;

/// Provides insert and watermark queries for punch records.
pub struct PunchRepo;

impl PunchRepo {
    /// Insert a batch of punches for one machine.
    ///
    /// Uses a single INSERT with multiple value rows; `created_at` is
    /// assigned by the database. Returns the number of rows written.
    pub async fn insert_batch(
        pool: &PgPool,
        machine_id: DbId,
        records: &[CreatePunchRecord],
    ) -> Result<u64, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut query = String::from(
            "INSERT INTO punch_records \
             (emp_no, punch_time, shift_in, shift_out, remarks, device_log_id, \
              machine_id, machine_ip, machine_port) VALUES ",
        );
        let mut param_idx = 1usize;
        let mut first = true;

        for _ in records {
            if !first {
                query.push_str(", ");
            }
            first = false;
            query.push('(');
            for i in 0..INSERT_PARAMS {
                if i > 0 {
                    query.push_str(", ");
                }
                query.push_str(&format!("${param_idx}"));
                param_idx += 1;
            }
            query.push(')');
        }

        let mut q = sqlx::query(&query);
        for record in records {
            q = q
                .bind(&record.emp_no)
                .bind(record.punch_time)
                .bind(record.shift_in)
                .bind(record.shift_out)
                .bind(&record.remarks)
                .bind(record.device_log_id)
                .bind(machine_id)
                .bind(&record.machine_ip)
                .bind(record.machine_port);
        }

        let result = q.execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Highest device-reported punch time recorded for a machine.
    ///
    /// Returns `None` when no punches have ever been captured for that
    /// machine (a full fetch is then required).
    pub async fn max_punch_time(
        pool: &PgPool,
        machine_id: DbId,
        machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DeviceTimestamp>>(
            "SELECT MAX(punch_time) FROM punch_records \
             WHERE machine_id = $1 AND machine_ip = $2",
        )
        .bind(machine_id)
        .bind(machine_ip)
        .fetch_one(pool)
        .await
    }

    /// Highest persistence-creation time recorded for a machine, projected
    /// into the device-time domain (UTC wall clock).
    pub async fn max_created_at(
        pool: &PgPool,
        machine_id: DbId,
        machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<DeviceTimestamp>>(
            "SELECT MAX(created_at AT TIME ZONE 'UTC') FROM punch_records \
             WHERE machine_id = $1 AND machine_ip = $2",
        )
        .bind(machine_id)
        .bind(machine_ip)
        .fetch_one(pool)
        .await
    }

    /// List punches for a machine, newest device time first.
    pub async fn list_for_machine(
        pool: &PgPool,
        machine_id: DbId,
        limit: i64,
    ) -> Result<Vec<PunchRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM punch_records \
             WHERE machine_id = $1 ORDER BY punch_time DESC LIMIT $2"
        );
        sqlx::query_as::<_, PunchRecord>(&query)
            .bind(machine_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

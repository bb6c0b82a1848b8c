//! Repository for the `machines` registry table.

use attsync_core::types::DbId;
use sqlx::PgPool;

use crate::models::machine::{CreateMachine, Machine};

/// Column list for `machines` SELECT queries.
const COLUMNS: &str = "\
    id, name, ip_address, port, is_active, is_fetch_all, \
    serial_number, description, device_model, created_at, last_updated";

/// Provides read access to the machine registry.
///
/// The registry is owned by administrative tooling; the sync engine reads
/// the active set once per cycle and must tolerate it changing between
/// cycles.
pub struct MachineRepo;

impl MachineRepo {
    /// List every machine currently flagged active, in registry order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Machine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM machines WHERE is_active = TRUE ORDER BY id");
        sqlx::query_as::<_, Machine>(&query).fetch_all(pool).await
    }

    /// List all machines, active or not.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Machine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM machines ORDER BY id");
        sqlx::query_as::<_, Machine>(&query).fetch_all(pool).await
    }

    /// Find a machine by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Machine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM machines WHERE id = $1");
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Register a new machine.
    pub async fn create(pool: &PgPool, dto: &CreateMachine) -> Result<Machine, sqlx::Error> {
        let query = format!(
            "INSERT INTO machines \
             (name, ip_address, port, is_active, is_fetch_all, serial_number, description, device_model) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(&dto.name)
            .bind(&dto.ip_address)
            .bind(dto.port)
            .bind(dto.is_active)
            .bind(dto.is_fetch_all)
            .bind(&dto.serial_number)
            .bind(&dto.description)
            .bind(&dto.device_model)
            .fetch_one(pool)
            .await
    }
}

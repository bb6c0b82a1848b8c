//! Persistence seam for the orchestration engines.

use async_trait::async_trait;
use attsync_core::types::{DbId, DeviceTimestamp};
use attsync_db::models::machine::Machine;
use attsync_db::models::punch::CreatePunchRecord;
use attsync_db::models::sync_log::CreateSyncLog;
use attsync_db::models::transfer::CreateTransferLog;
use attsync_db::repositories::{MachineRepo, PunchRepo, SyncLogRepo, TransferRepo};
use attsync_db::DbPool;

/// The subset of the repository layer the engines depend on.
#[async_trait]
pub trait SyncStore: Send + Sync {
    async fn list_active_machines(&self) -> Result<Vec<Machine>, sqlx::Error>;

    async fn max_punch_time(
        &self,
        machine_id: DbId,
        machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error>;

    async fn max_created_at(
        &self,
        machine_id: DbId,
        machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error>;

    async fn insert_punches(
        &self,
        machine_id: DbId,
        records: &[CreatePunchRecord],
    ) -> Result<u64, sqlx::Error>;

    async fn insert_sync_log(&self, entry: &CreateSyncLog) -> Result<(), sqlx::Error>;

    async fn insert_transfer_log(&self, entry: &CreateTransferLog) -> Result<(), sqlx::Error>;
}

/// Production store backed by the Postgres repositories.
pub struct PgSyncStore {
    pool: DbPool,
}

impl PgSyncStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStore for PgSyncStore {
    async fn list_active_machines(&self) -> Result<Vec<Machine>, sqlx::Error> {
        MachineRepo::list_active(&self.pool).await
    }

    async fn max_punch_time(
        &self,
        machine_id: DbId,
        machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
        PunchRepo::max_punch_time(&self.pool, machine_id, machine_ip).await
    }

    async fn max_created_at(
        &self,
        machine_id: DbId,
        machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
        PunchRepo::max_created_at(&self.pool, machine_id, machine_ip).await
    }

    async fn insert_punches(
        &self,
        machine_id: DbId,
        records: &[CreatePunchRecord],
    ) -> Result<u64, sqlx::Error> {
        PunchRepo::insert_batch(&self.pool, machine_id, records).await
    }

    async fn insert_sync_log(&self, entry: &CreateSyncLog) -> Result<(), sqlx::Error> {
        SyncLogRepo::insert(&self.pool, entry).await.map(|_| ())
    }

    async fn insert_transfer_log(&self, entry: &CreateTransferLog) -> Result<(), sqlx::Error> {
        TransferRepo::insert(&self.pool, entry).await.map(|_| ())
    }
}

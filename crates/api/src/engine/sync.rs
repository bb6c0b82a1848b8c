//! Device synchronization engine.
//!
//! One cycle runs one fully isolated fetch-dedup-persist-audit attempt per
//! active machine. Machines are dispatched with bounded concurrency;
//! same-address serialization is enforced by the session locks shared with
//! the transfer orchestrator. Whatever happens to one machine (refused
//! connection, mid-read error, insert failure), exactly one audit row is
//! written for it and every other machine still gets its attempt.

use std::sync::Arc;

use attsync_core::direction::{DirectionLedger, PunchDirection};
use attsync_core::sync::{SyncStatus, MSG_CONNECT_FAILED, MSG_FETCHED, MSG_NO_NEW_RECORDS};
use attsync_core::types::{DeviceTimestamp, Timestamp};
use attsync_db::models::machine::Machine;
use attsync_db::models::punch::CreatePunchRecord;
use attsync_db::models::sync_log::CreateSyncLog;
use attsync_device::{DeviceCapability, DeviceError, DeviceSession, RawPunch, SessionLocks};
use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::engine::store::SyncStore;
use crate::engine::watermark::{self, WatermarkMode};

/// Tally of one cycle's per-machine outcomes, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub machines: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errored: usize,
}

/// Failure inside an established session.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("{0}")]
    Device(#[from] DeviceError),
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Drives sync cycles over the active machine fleet.
pub struct SyncEngine {
    store: Arc<dyn SyncStore>,
    device: Arc<dyn DeviceCapability>,
    locks: Arc<SessionLocks>,
    watermark_mode: WatermarkMode,
    concurrency: usize,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn SyncStore>,
        device: Arc<dyn DeviceCapability>,
        locks: Arc<SessionLocks>,
        watermark_mode: WatermarkMode,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            device,
            locks,
            watermark_mode,
            concurrency: concurrency.max(1),
        }
    }

    /// Run one cycle over every currently active machine.
    ///
    /// Never fails: a machine's failure is absorbed into its audit entry,
    /// and a failure to even list the machines is logged and produces an
    /// empty report. The active set is re-read on every call.
    pub async fn run_cycle(self: &Arc<Self>) -> CycleReport {
        let machines = match self.store.list_active_machines().await {
            Ok(machines) => machines,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list active machines; skipping cycle");
                return CycleReport::default();
            }
        };

        let mut report = CycleReport {
            machines: machines.len(),
            ..CycleReport::default()
        };
        tracing::info!(machines = machines.len(), "Sync cycle started");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for machine in machines {
            let engine = Arc::clone(self);
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .expect("cycle semaphore never closes");
            tasks.spawn(async move {
                let _permit = permit;
                engine.sync_machine(&machine).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(SyncStatus::Success) => report.succeeded += 1,
                Ok(SyncStatus::Failed) => report.failed += 1,
                Ok(SyncStatus::Error) => report.errored += 1,
                Err(e) => {
                    report.errored += 1;
                    tracing::error!(error = %e, "Sync task panicked");
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            errored = report.errored,
            "Sync cycle finished"
        );
        report
    }

    /// One isolated synchronization attempt against one machine.
    async fn sync_machine(&self, machine: &Machine) -> SyncStatus {
        let started_at = Utc::now();
        let addr = format!("{}:{}", machine.ip_address, machine.port);

        // Claim the address, then connect. A busy address means the
        // transfer orchestrator (or a stale cycle) owns the device right
        // now; both are reported exactly like an unreachable device.
        let connected = match self.locks.try_acquire(&addr) {
            Ok(permit) => match self
                .device
                .connect(&machine.ip_address, machine.port as u16)
                .await
            {
                Ok(session) => Some((permit, session)),
                Err(e) => {
                    tracing::warn!(machine_id = machine.id, addr = %addr, error = %e, "Connection failed");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(machine_id = machine.id, addr = %addr, error = %e, "Device session busy");
                None
            }
        };

        let Some((_permit, mut session)) = connected else {
            self.audit(machine, SyncStatus::Failed, 0, MSG_CONNECT_FAILED, started_at, None)
                .await;
            return SyncStatus::Failed;
        };

        let outcome = self.fetch_and_persist(machine, session.as_mut()).await;

        // The session is closed on every path out of the fetch, success or
        // not; the address permit drops with this scope.
        session.disconnect().await;

        match outcome {
            Ok(count) => {
                let message = if count > 0 { MSG_FETCHED } else { MSG_NO_NEW_RECORDS };
                tracing::info!(machine_id = machine.id, addr = %addr, records = count, "Sync succeeded");
                self.audit(
                    machine,
                    SyncStatus::Success,
                    count,
                    message,
                    started_at,
                    Some(Utc::now()),
                )
                .await;
                SyncStatus::Success
            }
            Err(e) => {
                tracing::error!(machine_id = machine.id, addr = %addr, error = %e, "Sync attempt failed");
                self.audit(
                    machine,
                    SyncStatus::Error,
                    0,
                    &format!("Exception: {e}"),
                    started_at,
                    None,
                )
                .await;
                SyncStatus::Error
            }
        }
    }

    /// Read the machine's log, apply the watermark, and persist the batch.
    ///
    /// Returns the number of records persisted. Terminals cannot filter
    /// their log server-side, so an incremental fetch reads the full log
    /// and keeps entries strictly newer than the cutoff.
    async fn fetch_and_persist(
        &self,
        machine: &Machine,
        session: &mut dyn DeviceSession,
    ) -> Result<i32, FetchError> {
        let cutoff = if machine.is_fetch_all {
            None
        } else {
            watermark::resolve(
                self.store.as_ref(),
                self.watermark_mode,
                machine.id,
                &machine.ip_address,
            )
            .await?
        };

        let raw = session.read_punch_log().await?;
        let batch = build_batch(machine, raw, cutoff);
        if batch.is_empty() {
            return Ok(0);
        }

        let written = self.store.insert_punches(machine.id, &batch).await?;
        Ok(written as i32)
    }

    /// Append the audit entry for this attempt. An audit write failure is
    /// logged and swallowed; it must not take the cycle down with it.
    async fn audit(
        &self,
        machine: &Machine,
        status: SyncStatus,
        records_read: i32,
        message: &str,
        started_at: Timestamp,
        ended_at: Option<Timestamp>,
    ) {
        let entry = CreateSyncLog {
            machine_id: machine.id,
            machine_ip: machine.ip_address.clone(),
            status,
            records_read,
            message: message.to_string(),
            started_at,
            ended_at,
        };
        if let Err(e) = self.store.insert_sync_log(&entry).await {
            tracing::error!(machine_id = machine.id, error = %e, "Failed to write sync audit entry");
        }
    }
}

/// Shape a raw device log into insertable punch records.
///
/// Direction inference runs over the complete log so the per-employee
/// alternation is seeded by the employee's actual first punch, then the
/// watermark cutoff drops entries already captured (strictly-newer
/// comparison: a punch exactly at the cutoff is excluded). Entries with a
/// non-numeric employee id are skipped; terminals occasionally emit
/// corrupted ids and one bad entry must not sink the batch.
fn build_batch(
    machine: &Machine,
    raw: Vec<RawPunch>,
    cutoff: Option<DeviceTimestamp>,
) -> Vec<CreatePunchRecord> {
    let mut ledger = DirectionLedger::new();
    let mut batch = Vec::with_capacity(raw.len());

    for punch in raw {
        if punch.emp_no.parse::<u64>().is_err() {
            tracing::warn!(
                machine_id = machine.id,
                emp_no = %punch.emp_no,
                "Skipping punch with non-numeric employee id"
            );
            continue;
        }

        let direction = ledger.classify(&punch.emp_no, punch.state.direction());

        if let Some(cutoff) = cutoff {
            if punch.punch_time <= cutoff {
                continue;
            }
        }

        batch.push(CreatePunchRecord {
            emp_no: punch.emp_no,
            punch_time: punch.punch_time,
            shift_in: direction == PunchDirection::ShiftIn,
            shift_out: direction == PunchDirection::ShiftOut,
            remarks: None,
            device_log_id: punch.work_code,
            machine_ip: machine.ip_address.clone(),
            machine_port: machine.port,
        });
    }

    batch
}

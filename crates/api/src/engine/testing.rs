//! In-memory fakes shared by the engine test modules.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use attsync_core::types::{DbId, DeviceTimestamp};
use attsync_db::models::machine::Machine;
use attsync_db::models::punch::CreatePunchRecord;
use attsync_db::models::sync_log::CreateSyncLog;
use attsync_db::models::transfer::CreateTransferLog;
use attsync_device::{
    DeviceCapability, DeviceError, DeviceSession, EmployeeRecord, PunchState, RawPunch,
};
use chrono::{NaiveDate, Utc};

use crate::engine::store::SyncStore;

/// Build a registry entry for tests. Port is always the default 4370.
pub fn machine(id: DbId, ip: &str, is_fetch_all: bool) -> Machine {
    Machine {
        id,
        name: format!("machine-{id}"),
        ip_address: ip.to_string(),
        port: 4370,
        is_active: true,
        is_fetch_all,
        serial_number: None,
        description: None,
        device_model: None,
        created_at: Utc::now(),
        last_updated: None,
    }
}

/// Build a raw device punch in June 2025 at `day`/`hour`.
pub fn raw_punch(emp_no: &str, day: u32, hour: u32, state: PunchState) -> RawPunch {
    RawPunch {
        emp_no: emp_no.to_string(),
        punch_time: NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        state,
        work_code: None,
    }
}

pub fn employee(emp_no: &str, emp_name: &str) -> EmployeeRecord {
    EmployeeRecord {
        emp_no: emp_no.to_string(),
        emp_name: emp_name.to_string(),
    }
}

fn storage_error() -> sqlx::Error {
    sqlx::Error::Protocol("storage unavailable".to_string())
}

// ---------------------------------------------------------------------------
// Store fake
// ---------------------------------------------------------------------------

/// In-memory [`SyncStore`] recording everything the engines write.
#[derive(Default)]
pub struct MockStore {
    pub machines: Vec<Machine>,
    pub punch_watermarks: HashMap<DbId, DeviceTimestamp>,
    pub created_watermarks: HashMap<DbId, DeviceTimestamp>,
    pub fail_machine_listing: bool,
    pub fail_punch_inserts: bool,
    pub fail_transfer_inserts: bool,
    pub inserted_punches: Mutex<Vec<(DbId, Vec<CreatePunchRecord>)>>,
    pub sync_logs: Mutex<Vec<CreateSyncLog>>,
    pub transfer_logs: Mutex<Vec<CreateTransferLog>>,
}

#[async_trait]
impl SyncStore for MockStore {
    async fn list_active_machines(&self) -> Result<Vec<Machine>, sqlx::Error> {
        if self.fail_machine_listing {
            return Err(storage_error());
        }
        Ok(self.machines.clone())
    }

    async fn max_punch_time(
        &self,
        machine_id: DbId,
        _machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
        Ok(self.punch_watermarks.get(&machine_id).copied())
    }

    async fn max_created_at(
        &self,
        machine_id: DbId,
        _machine_ip: &str,
    ) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
        Ok(self.created_watermarks.get(&machine_id).copied())
    }

    async fn insert_punches(
        &self,
        machine_id: DbId,
        records: &[CreatePunchRecord],
    ) -> Result<u64, sqlx::Error> {
        if self.fail_punch_inserts {
            return Err(storage_error());
        }
        let count = records.len() as u64;
        self.inserted_punches
            .lock()
            .unwrap()
            .push((machine_id, records.to_vec()));
        Ok(count)
    }

    async fn insert_sync_log(&self, entry: &CreateSyncLog) -> Result<(), sqlx::Error> {
        self.sync_logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn insert_transfer_log(&self, entry: &CreateTransferLog) -> Result<(), sqlx::Error> {
        if self.fail_transfer_inserts {
            return Err(storage_error());
        }
        self.transfer_logs.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Device fake
// ---------------------------------------------------------------------------

/// In-memory [`DeviceCapability`] keyed by machine IP.
#[derive(Default)]
pub struct MockDevice {
    pub punch_logs: HashMap<String, Vec<RawPunch>>,
    pub employees: HashMap<String, Vec<EmployeeRecord>>,
    /// Connection attempts against these IPs fail outright.
    pub unreachable: HashSet<String>,
    /// Log reads against these IPs fail after a successful connect.
    pub read_failures: HashSet<String>,
    /// Uploads of `(destination_ip, emp_no)` pairs are rejected.
    pub upload_failures: HashSet<(String, String)>,
    connects: Mutex<Vec<String>>,
    disconnects: Arc<AtomicUsize>,
}

impl MockDevice {
    /// IPs that received a connection attempt, in order.
    pub fn connect_log(&self) -> Vec<String> {
        self.connects.lock().unwrap().clone()
    }

    /// Number of sessions that were disconnected.
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceCapability for MockDevice {
    async fn connect(&self, ip: &str, _port: u16) -> Result<Box<dyn DeviceSession>, DeviceError> {
        self.connects.lock().unwrap().push(ip.to_string());
        if self.unreachable.contains(ip) {
            return Err(DeviceError::ConnectFailed {
                addr: ip.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(MockSession {
            ip: ip.to_string(),
            punches: self.punch_logs.get(ip).cloned().unwrap_or_default(),
            employees: self.employees.get(ip).cloned().unwrap_or_default(),
            fail_reads: self.read_failures.contains(ip),
            upload_failures: self.upload_failures.clone(),
            disconnects: Arc::clone(&self.disconnects),
        }))
    }
}

struct MockSession {
    ip: String,
    punches: Vec<RawPunch>,
    employees: Vec<EmployeeRecord>,
    fail_reads: bool,
    upload_failures: HashSet<(String, String)>,
    disconnects: Arc<AtomicUsize>,
}

#[async_trait]
impl DeviceSession for MockSession {
    async fn read_punch_log(&mut self) -> Result<Vec<RawPunch>, DeviceError> {
        if self.fail_reads {
            return Err(DeviceError::Protocol("malformed log data".to_string()));
        }
        Ok(self.punches.clone())
    }

    async fn read_employees(&mut self) -> Result<Vec<EmployeeRecord>, DeviceError> {
        if self.fail_reads {
            return Err(DeviceError::Protocol("malformed user data".to_string()));
        }
        Ok(self.employees.clone())
    }

    async fn upload_employee(&mut self, employee: &EmployeeRecord) -> Result<(), DeviceError> {
        let key = (self.ip.clone(), employee.emp_no.clone());
        if self.upload_failures.contains(&key) {
            return Err(DeviceError::Protocol("upload rejected".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

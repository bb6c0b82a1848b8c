//! Employee transfer orchestrator.
//!
//! Copies enrollments from one source terminal to one or more destinations
//! with connection reuse: the source is read once, then each destination
//! is connected once and receives every requested employee before the
//! session closes. There is no atomicity across destinations and no
//! rollback of device-side writes; failures are accounted per
//! (employee, destination) pair and reported in the aggregate result.

use std::sync::Arc;

use attsync_core::transfer::{TransferResult, TransferTally};
use attsync_db::models::transfer::CreateTransferLog;
use attsync_device::{
    DeviceCapability, DeviceError, DeviceSession, EmployeeRecord, SessionLocks, SessionPermit,
    DEFAULT_DEVICE_PORT,
};

use crate::engine::store::SyncStore;

/// A transfer request, after ingress deserialization.
#[derive(Debug, Clone)]
pub struct TransferSpec {
    pub source_ip: String,
    /// Transfer every employee enrolled on the source instead of
    /// `employees`.
    pub transfer_all_employees: bool,
    pub employees: Vec<EmployeeRecord>,
    /// Target every other active machine instead of `destination_ips`.
    pub transfer_all_machines: bool,
    pub destination_ips: Vec<String>,
    /// Who initiated the transfer; recorded with each success.
    pub user_id: String,
}

/// Drives employee transfers between terminals.
pub struct TransferEngine {
    store: Arc<dyn SyncStore>,
    device: Arc<dyn DeviceCapability>,
    locks: Arc<SessionLocks>,
}

impl TransferEngine {
    pub fn new(
        store: Arc<dyn SyncStore>,
        device: Arc<dyn DeviceCapability>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            device,
            locks,
        }
    }

    /// Execute one transfer operation.
    ///
    /// Only a failure to resolve the destination set from the registry is
    /// a hard error; everything device-side is absorbed into the result's
    /// counters and message.
    pub async fn transfer(&self, spec: TransferSpec) -> Result<TransferResult, sqlx::Error> {
        let mut tally = TransferTally::new();
        let mut staged: Vec<CreateTransferLog> = Vec::new();

        let destinations: Vec<(String, u16)> = if spec.transfer_all_machines {
            self.store
                .list_active_machines()
                .await?
                .into_iter()
                .filter(|m| m.ip_address != spec.source_ip)
                .map(|m| (m.ip_address, m.port as u16))
                .collect()
        } else {
            spec.destination_ips
                .iter()
                .map(|ip| (ip.clone(), DEFAULT_DEVICE_PORT))
                .collect()
        };

        // One connection to the source, closed before any destination is
        // touched. If it fails, every pair is failed and no destination is
        // contacted.
        let source_employees = match self.fetch_source_employees(&spec.source_ip).await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(source = %spec.source_ip, error = %e, "Transfer aborted: source unreachable");
                let pairs = (spec.employees.len() * destinations.len()) as u32;
                tally.record_failures(
                    pairs,
                    &format!("Failed to connect to source machine {}.", spec.source_ip),
                );
                return Ok(tally.into_result());
            }
        };

        let requested: Vec<EmployeeRecord> = if spec.transfer_all_employees {
            source_employees.clone()
        } else {
            spec.employees.clone()
        };

        for (dest_ip, dest_port) in &destinations {
            let (_permit, mut session) = match self.open(dest_ip, *dest_port).await {
                Ok(open) => open,
                Err(e) => {
                    tracing::warn!(destination = %dest_ip, error = %e, "Destination unreachable");
                    tally.record_failures(
                        requested.len() as u32,
                        &format!("Failed to connect to destination machine {dest_ip}."),
                    );
                    continue;
                }
            };

            for emp in &requested {
                let Some(record) = source_employees.iter().find(|e| e.emp_no == emp.emp_no) else {
                    tally.record_failure(&format!(
                        "Employee {} not found on source machine {}.",
                        emp.emp_no, spec.source_ip
                    ));
                    continue;
                };

                match session.upload_employee(record).await {
                    Ok(()) => {
                        tally.record_success();
                        staged.push(CreateTransferLog {
                            emp_no: record.emp_no.clone(),
                            emp_name: record.emp_name.clone(),
                            source_ip: spec.source_ip.clone(),
                            destination_ip: dest_ip.clone(),
                            created_by: spec.user_id.clone(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            destination = %dest_ip,
                            emp_no = %record.emp_no,
                            error = %e,
                            "Employee upload failed"
                        );
                        tally.record_failure(&format!(
                            "Failed to upload employee {} to {dest_ip}.",
                            record.emp_no
                        ));
                    }
                }
            }

            session.disconnect().await;
        }

        // The enrollments are already on the destinations; a failed audit
        // insert is reported but rolls nothing back.
        for entry in &staged {
            if let Err(e) = self.store.insert_transfer_log(entry).await {
                tracing::error!(emp_no = %entry.emp_no, error = %e, "Failed to record transfer");
                tally.append_error(&format!(
                    "DB insert failed for employee {} to {}: {e}.",
                    entry.emp_no, entry.destination_ip
                ));
            }
        }

        Ok(tally.into_result())
    }

    /// Read the enrollment lists of the given machines, merged.
    ///
    /// A machine that cannot be reached or read contributes nothing; the
    /// caller only ever sees the merged list.
    pub async fn list_employees(&self, addresses: &[String]) -> Vec<EmployeeRecord> {
        let mut merged = Vec::new();
        for ip in addresses {
            match self.open(ip, DEFAULT_DEVICE_PORT).await {
                Ok((_permit, mut session)) => {
                    match session.read_employees().await {
                        Ok(list) => merged.extend(list),
                        Err(e) => {
                            tracing::warn!(addr = %ip, error = %e, "Failed to read employees")
                        }
                    }
                    session.disconnect().await;
                }
                Err(e) => {
                    tracing::debug!(addr = %ip, error = %e, "Skipping unreachable machine");
                }
            }
        }
        merged
    }

    /// Fetch the source's full enrollment list over a short-lived session.
    async fn fetch_source_employees(
        &self,
        source_ip: &str,
    ) -> Result<Vec<EmployeeRecord>, DeviceError> {
        let (_permit, mut session) = self.open(source_ip, DEFAULT_DEVICE_PORT).await?;
        let result = session.read_employees().await;
        session.disconnect().await;
        result
    }

    /// Claim the address and connect. Holding the permit for the life of
    /// the session keeps sync cycles off this device meanwhile.
    async fn open(
        &self,
        ip: &str,
        port: u16,
    ) -> Result<(SessionPermit, Box<dyn DeviceSession>), DeviceError> {
        let permit = self.locks.try_acquire(&format!("{ip}:{port}"))?;
        let session = self.device.connect(ip, port).await?;
        Ok((permit, session))
    }
}

//! Employee transfer audit models.

use attsync_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One successfully transferred (employee, destination) pair.
///
/// Only successful uploads are recorded; failures live in the transfer
/// result message returned to the caller.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransferLogEntry {
    pub id: DbId,
    pub emp_no: String,
    pub emp_name: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub created_by: String,
    pub created_at: Timestamp,
}

/// DTO for recording a successful transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferLog {
    pub emp_no: String,
    pub emp_name: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub created_by: String,
}

//! Sync cycle outcome vocabulary.
//!
//! Status values and canonical audit messages shared by the sync engine and
//! the repository layer. The audit trail stores the status as text, so the
//! string forms here are part of the persisted format.

use serde::Serialize;

/// Outcome of one synchronization attempt against one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    /// The device was read (possibly yielding zero new records).
    Success,
    /// The connection could not be established.
    Failed,
    /// The session was established but a later step raised an error.
    Error,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Success => "Success",
            SyncStatus::Failed => "Failed",
            SyncStatus::Error => "Error",
        }
    }
}

/// Audit message for a fetch that persisted at least one record.
pub const MSG_FETCHED: &str = "Fetched successfully.";

/// Audit message for a successful fetch that found nothing new.
pub const MSG_NO_NEW_RECORDS: &str = "No new records found.";

/// Audit message for a failed connection attempt.
///
/// The cause cannot be distinguished from the outside, so the message
/// enumerates the usual suspects for the operator reading the audit trail.
pub const MSG_CONNECT_FAILED: &str = "Connection failed. Possible reasons: \
1. Device is offline or unreachable. \
2. Device port is blocked by a firewall. \
3. Another system is already connected to the device. \
4. SDK connection is not allowed in device settings. \
5. Network issues.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_matches_persisted_format() {
        assert_eq!(SyncStatus::Success.as_str(), "Success");
        assert_eq!(SyncStatus::Failed.as_str(), "Failed");
        assert_eq!(SyncStatus::Error.as_str(), "Error");
    }
}

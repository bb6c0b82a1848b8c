//! Transfer outcome accounting.
//!
//! A transfer touches `employees x destinations` pairs and must keep going
//! past individual failures, so the tally accumulates counts and a running
//! human-readable failure log instead of short-circuiting. The summary line
//! is appended when the tally is turned into the final result.

use serde::Serialize;

/// Aggregate result of one transfer operation, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub success_count: u32,
    pub fail_count: u32,
    pub message: String,
}

/// Running success/failure accounting for a transfer in progress.
#[derive(Debug, Default)]
pub struct TransferTally {
    success_count: u32,
    fail_count: u32,
    message: String,
}

impl TransferTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully uploaded (employee, destination) pair.
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Record `count` failed pairs with a shared reason.
    pub fn record_failures(&mut self, count: u32, reason: &str) {
        self.fail_count += count;
        self.message.push_str(&format!("[ERROR] {reason} "));
    }

    /// Record one failed pair.
    pub fn record_failure(&mut self, reason: &str) {
        self.record_failures(1, reason);
    }

    /// Append an error that does not affect the pair counts, e.g. an audit
    /// insert failing after the device-side upload already succeeded.
    pub fn append_error(&mut self, reason: &str) {
        self.message.push_str(&format!("[ERROR] {reason} "));
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    /// Finish the tally, appending the summary line.
    pub fn into_result(self) -> TransferResult {
        let message = format!(
            "{}[SUMMARY] Success: {}, Failed: {}",
            self.message, self.success_count, self.fail_count
        );
        TransferResult {
            success_count: self.success_count,
            fail_count: self.fail_count,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_yields_zero_counts_and_summary_only() {
        let result = TransferTally::new().into_result();
        assert_eq!(result.success_count, 0);
        assert_eq!(result.fail_count, 0);
        assert_eq!(result.message, "[SUMMARY] Success: 0, Failed: 0");
    }

    #[test]
    fn successes_and_failures_are_counted_independently() {
        let mut tally = TransferTally::new();
        tally.record_success();
        tally.record_success();
        tally.record_failure("Employee 42 not found on source machine 10.0.0.1.");
        let result = tally.into_result();
        assert_eq!(result.success_count, 2);
        assert_eq!(result.fail_count, 1);
    }

    #[test]
    fn batch_failures_count_every_pair() {
        let mut tally = TransferTally::new();
        tally.record_failures(6, "Failed to connect to source machine 10.0.0.1.");
        assert_eq!(tally.fail_count(), 6);
        let result = tally.into_result();
        assert_eq!(result.fail_count, 6);
        assert!(result
            .message
            .starts_with("[ERROR] Failed to connect to source machine 10.0.0.1. "));
    }

    #[test]
    fn failure_reasons_are_enumerated_in_order() {
        let mut tally = TransferTally::new();
        tally.record_failure("first");
        tally.record_failure("second");
        let result = tally.into_result();
        assert_eq!(
            result.message,
            "[ERROR] first [ERROR] second [SUMMARY] Success: 0, Failed: 2"
        );
    }

    #[test]
    fn appended_errors_do_not_change_counts() {
        let mut tally = TransferTally::new();
        tally.record_success();
        tally.append_error("DB insert failed for employee 42 to 10.0.0.2: timeout.");
        let result = tally.into_result();
        assert_eq!(result.success_count, 1);
        assert_eq!(result.fail_count, 0);
        assert!(result.message.contains("DB insert failed"));
    }
}

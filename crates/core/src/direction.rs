//! Punch direction inference.
//!
//! Terminals report an in/out mode with every log entry, but many units are
//! configured without direction keys and report an ambiguous mode instead.
//! For those entries the direction alternates per employee, seeded by the
//! first punch seen for that employee within the batch being processed.

use std::collections::HashMap;

/// The direction of a single punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchDirection {
    ShiftIn,
    ShiftOut,
}

impl PunchDirection {
    /// The direction that follows this one in the alternation rule.
    pub fn opposite(self) -> Self {
        match self {
            PunchDirection::ShiftIn => PunchDirection::ShiftOut,
            PunchDirection::ShiftOut => PunchDirection::ShiftIn,
        }
    }
}

/// Per-employee direction state for a single fetch batch.
///
/// The ledger must not outlive one batch: alternation is only meaningful
/// between punches read in the same pass over a device log.
#[derive(Debug, Default)]
pub struct DirectionLedger {
    last_seen: HashMap<String, PunchDirection>,
}

impl DirectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one punch for `emp_no`.
    ///
    /// An explicit direction from the device wins and is recorded as that
    /// employee's last-seen direction. An ambiguous punch alternates from
    /// the last-seen direction; the first ambiguous punch for an employee
    /// defaults to shift-in.
    pub fn classify(&mut self, emp_no: &str, marked: Option<PunchDirection>) -> PunchDirection {
        let direction = match marked {
            Some(direction) => direction,
            None => match self.last_seen.get(emp_no) {
                Some(last) => last.opposite(),
                None => PunchDirection::ShiftIn,
            },
        };
        self.last_seen.insert(emp_no.to_string(), direction);
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Explicit device markers pass through
    // -----------------------------------------------------------------------

    #[test]
    fn explicit_in_is_kept() {
        let mut ledger = DirectionLedger::new();
        assert_eq!(
            ledger.classify("100", Some(PunchDirection::ShiftIn)),
            PunchDirection::ShiftIn
        );
    }

    #[test]
    fn explicit_out_is_kept() {
        let mut ledger = DirectionLedger::new();
        assert_eq!(
            ledger.classify("100", Some(PunchDirection::ShiftOut)),
            PunchDirection::ShiftOut
        );
    }

    // -----------------------------------------------------------------------
    // Ambiguous punches alternate
    // -----------------------------------------------------------------------

    #[test]
    fn first_ambiguous_punch_defaults_to_shift_in() {
        let mut ledger = DirectionLedger::new();
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftIn);
    }

    #[test]
    fn ambiguous_punches_alternate_per_employee() {
        let mut ledger = DirectionLedger::new();
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftIn);
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftOut);
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftIn);
    }

    #[test]
    fn alternation_is_independent_across_employees() {
        let mut ledger = DirectionLedger::new();
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftIn);
        // A different employee starts its own sequence.
        assert_eq!(ledger.classify("200", None), PunchDirection::ShiftIn);
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftOut);
        assert_eq!(ledger.classify("200", None), PunchDirection::ShiftOut);
    }

    // -----------------------------------------------------------------------
    // Explicit markers reseed the alternation
    // -----------------------------------------------------------------------

    #[test]
    fn explicit_marker_updates_last_seen_state() {
        let mut ledger = DirectionLedger::new();
        ledger.classify("100", Some(PunchDirection::ShiftOut));
        // The next ambiguous punch alternates from the explicit OUT.
        assert_eq!(ledger.classify("100", None), PunchDirection::ShiftIn);
    }
}

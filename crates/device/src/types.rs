//! Records as they come off a terminal, before any persistence shaping.

use attsync_core::direction::PunchDirection;
use attsync_core::types::DeviceTimestamp;
use serde::{Deserialize, Serialize};

/// Port ZKTeco terminals listen on unless configured otherwise.
pub const DEFAULT_DEVICE_PORT: u16 = 4370;

/// In/out marker reported by the terminal for a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchState {
    In,
    Out,
    /// The terminal did not distinguish direction for this entry; the
    /// sync engine infers it from the employee's punch sequence.
    Unspecified,
}

impl PunchState {
    /// The explicit direction, if the device reported one.
    pub fn direction(self) -> Option<PunchDirection> {
        match self {
            PunchState::In => Some(PunchDirection::ShiftIn),
            PunchState::Out => Some(PunchDirection::ShiftOut),
            PunchState::Unspecified => None,
        }
    }

    /// Map the raw in/out mode byte from the wire.
    pub fn from_mode(mode: u8) -> Self {
        match mode {
            0 => PunchState::In,
            1 => PunchState::Out,
            _ => PunchState::Unspecified,
        }
    }
}

/// One raw log entry read from a terminal.
#[derive(Debug, Clone)]
pub struct RawPunch {
    pub emp_no: String,
    pub punch_time: DeviceTimestamp,
    pub state: PunchState,
    /// Work code attached to the entry, when present.
    pub work_code: Option<i32>,
}

/// One enrollment record on a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub emp_no: String,
    pub emp_name: String,
}

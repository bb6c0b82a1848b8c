/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Device-local wall-clock time, as reported by a terminal.
///
/// Not comparable across devices; only ever compared to other readings
/// from the same machine.
pub type DeviceTimestamp = chrono::NaiveDateTime;

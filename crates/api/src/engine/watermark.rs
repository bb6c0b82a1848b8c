//! Watermark resolution for incremental fetches.

use attsync_core::types::{DbId, DeviceTimestamp};

use crate::engine::store::SyncStore;

/// Which recorded timestamp bounds the next incremental fetch.
///
/// `PunchTime` is the default: the cutoff is the highest device-reported
/// punch time already captured. `CreatedAt` bounds by persistence time
/// instead, for fleets whose device clocks cannot be trusted. The mode is
/// fixed per deployment; alternating between modes across cycles can
/// silently skip or duplicate punches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkMode {
    PunchTime,
    CreatedAt,
}

/// Compute the cutoff for one machine's next fetch.
///
/// `None` means no punches have ever been captured for this machine and a
/// full fetch is required. The value is recomputed from the store at every
/// cycle; it is never cached, because rows may be inserted out of band.
pub async fn resolve(
    store: &dyn SyncStore,
    mode: WatermarkMode,
    machine_id: DbId,
    machine_ip: &str,
) -> Result<Option<DeviceTimestamp>, sqlx::Error> {
    match mode {
        WatermarkMode::PunchTime => store.max_punch_time(machine_id, machine_ip).await,
        WatermarkMode::CreatedAt => store.max_created_at(machine_id, machine_ip).await,
    }
}

//! Long-lived background tasks spawned by the binary entrypoint.

pub mod device_sync;

//! Per-address session gate.
//!
//! A terminal accepts one active connection. The sync engine and the
//! transfer orchestrator run independently and may target the same
//! address, so both must acquire the address lock before connecting.
//! Acquisition never waits: a busy address is reported as
//! [`DeviceError::Busy`] and handled like any other connection failure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::error::DeviceError;

/// Registry of per-address single-flight locks.
#[derive(Debug, Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Exclusive claim on one device address. Released on drop, so every exit
/// path out of an orchestration attempt releases the device.
#[derive(Debug)]
pub struct SessionPermit {
    _guard: OwnedMutexGuard<()>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `addr` without waiting.
    pub fn try_acquire(&self, addr: &str) -> Result<SessionPermit, DeviceError> {
        let lock = {
            let mut map = self.inner.lock().expect("session lock registry poisoned");
            Arc::clone(
                map.entry(addr.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        match lock.try_lock_owned() {
            Ok(guard) => Ok(SessionPermit { _guard: guard }),
            Err(_) => Err(DeviceError::Busy {
                addr: addr.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn acquiring_a_free_address_succeeds() {
        let locks = SessionLocks::new();
        assert!(locks.try_acquire("10.0.0.1:4370").is_ok());
    }

    #[test]
    fn second_acquisition_of_same_address_is_busy() {
        let locks = SessionLocks::new();
        let _held = locks.try_acquire("10.0.0.1:4370").unwrap();
        assert_matches!(
            locks.try_acquire("10.0.0.1:4370"),
            Err(DeviceError::Busy { .. })
        );
    }

    #[test]
    fn distinct_addresses_are_independent() {
        let locks = SessionLocks::new();
        let _held = locks.try_acquire("10.0.0.1:4370").unwrap();
        assert!(locks.try_acquire("10.0.0.2:4370").is_ok());
    }

    #[test]
    fn dropping_the_permit_releases_the_address() {
        let locks = SessionLocks::new();
        let permit = locks.try_acquire("10.0.0.1:4370").unwrap();
        drop(permit);
        assert!(locks.try_acquire("10.0.0.1:4370").is_ok());
    }
}

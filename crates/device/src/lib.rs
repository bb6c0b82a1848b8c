//! Terminal access layer.
//!
//! Exposes attendance terminals to the rest of the service through the
//! [`DeviceCapability`] / [`DeviceSession`] traits, enforces the
//! one-session-per-address rule via [`SessionLocks`], and provides the
//! ZKTeco TCP implementation used in production.

pub mod capability;
pub mod error;
pub mod locks;
pub mod types;
pub mod zkteco;

pub use capability::{DeviceCapability, DeviceSession};
pub use error::DeviceError;
pub use locks::{SessionLocks, SessionPermit};
pub use types::{EmployeeRecord, PunchState, RawPunch, DEFAULT_DEVICE_PORT};
pub use zkteco::ZkTecoCapability;

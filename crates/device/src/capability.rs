//! The capability seam between the orchestration engines and real hardware.
//!
//! `connect` hands back an owned session handle; the caller keeps it for
//! the duration of one orchestration attempt and must call `disconnect`
//! on every exit path. Nothing here is shared between devices, so two
//! sessions can never bleed state into each other.

use async_trait::async_trait;

use crate::error::DeviceError;
use crate::types::{EmployeeRecord, RawPunch};

/// Factory for device sessions.
#[async_trait]
pub trait DeviceCapability: Send + Sync {
    /// Open a session to the terminal at `ip:port`.
    ///
    /// Implementations must bound the attempt with a timeout; a timeout is
    /// reported as an error, never by blocking indefinitely.
    async fn connect(&self, ip: &str, port: u16) -> Result<Box<dyn DeviceSession>, DeviceError>;
}

/// An open connection to one terminal.
#[async_trait]
pub trait DeviceSession: Send {
    /// Read the terminal's full punch log.
    async fn read_punch_log(&mut self) -> Result<Vec<RawPunch>, DeviceError>;

    /// Read the terminal's full enrollment list.
    async fn read_employees(&mut self) -> Result<Vec<EmployeeRecord>, DeviceError>;

    /// Write one enrollment record to the terminal.
    async fn upload_employee(&mut self, employee: &EmployeeRecord) -> Result<(), DeviceError>;

    /// Close the session. Infallible by contract: failures are logged and
    /// swallowed, since there is nothing useful a caller can do with them.
    async fn disconnect(&mut self);
}

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The TCP connection or protocol handshake failed.
    #[error("Failed to connect to device {addr}: {reason}")]
    ConnectFailed { addr: String, reason: String },

    /// Another session (sync or transfer) currently owns this address.
    #[error("Device {addr} is busy with another session")]
    Busy { addr: String },

    /// A socket operation exceeded the configured bound.
    #[error("Device operation timed out after {0:?}")]
    Timeout(Duration),

    /// The device replied with something the protocol does not allow here.
    #[error("Device protocol error: {0}")]
    Protocol(String),

    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

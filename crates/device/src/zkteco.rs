//! ZKTeco TCP transport.
//!
//! Implements the subset of the ZKTeco binary protocol the service needs:
//! the connect/exit handshake, buffered bulk reads for attendance logs and
//! user records, and single user upload. Packets are little-endian with a
//! 16-bit complement checksum; TCP frames carry an 8-byte transport prefix
//! in front of the 8-byte command header.

use std::time::Duration;

use async_trait::async_trait;
use attsync_core::types::DeviceTimestamp;
use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::capability::{DeviceCapability, DeviceSession};
use crate::error::DeviceError;
use crate::types::{EmployeeRecord, PunchState, RawPunch};

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

const CMD_CONNECT: u16 = 1000;
const CMD_EXIT: u16 = 1001;
const CMD_PREPARE_DATA: u16 = 1500;
const CMD_DATA: u16 = 1501;
const CMD_FREE_DATA: u16 = 1502;
const CMD_DATA_WRRQ: u16 = 1503;
const CMD_DATA_RDY: u16 = 1504;
const CMD_USER_WRQ: u16 = 8;
const CMD_REG_EVENT: u16 = 500;

const CMD_ACK_OK: u16 = 2000;
const CMD_ACK_UNAUTH: u16 = 2005;

const USHRT_MAX: u32 = 65535;
const MAX_CHUNK: usize = 65472;

/// TCP transport prefix bytes.
const TCP_PREFIX: [u8; 4] = [0x50, 0x50, 0x82, 0x7d];

/// Request payload selecting the attendance log table.
const GET_ATTENDANCE_LOGS: &[u8] = &[
    0x01, 0x0d, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Request payload selecting the user table.
const GET_USERS: &[u8] = &[
    0x01, 0x09, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// TCP user records are 72 bytes, attendance records 40 bytes.
const USER_RECORD_SIZE: usize = 72;
const ATT_RECORD_SIZE: usize = 40;

// ---------------------------------------------------------------------------
// Wire encoding
// ---------------------------------------------------------------------------

/// 16-bit complement checksum over the command header + data.
fn checksum(buf: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut i = 0;
    while i < buf.len() {
        if i == buf.len() - 1 {
            sum += buf[i] as u32;
        } else {
            sum += u16::from_le_bytes([buf[i], buf[i + 1]]) as u32;
        }
        sum %= USHRT_MAX;
        i += 2;
    }
    (USHRT_MAX - sum - 1) as u16
}

/// Build a full TCP frame: transport prefix + command header + data.
///
/// The wire reply id is `reply_id + 1`, per the protocol convention, and
/// the checksum covers the value actually sent.
fn encode_frame(command: u16, session_id: u16, reply_id: u16, data: &[u8]) -> Vec<u8> {
    let mut inner = vec![0u8; 8 + data.len()];
    inner[0..2].copy_from_slice(&command.to_le_bytes());
    inner[4..6].copy_from_slice(&session_id.to_le_bytes());
    let wire_reply = (reply_id.wrapping_add(1)) % (USHRT_MAX as u16);
    inner[6..8].copy_from_slice(&wire_reply.to_le_bytes());
    inner[8..].copy_from_slice(data);

    let sum = checksum(&inner);
    inner[2..4].copy_from_slice(&sum.to_le_bytes());

    let mut frame = vec![0x50u8, 0x50, 0x82, 0x7d, 0x00, 0x00, 0x00, 0x00];
    frame[4..6].copy_from_slice(&(inner.len() as u16).to_le_bytes());
    frame.extend_from_slice(&inner);
    frame
}

/// Decode the device's packed timestamp.
fn parse_zk_time(mut time: u32) -> DeviceTimestamp {
    let second = time % 60;
    time /= 60;
    let minute = time % 60;
    time /= 60;
    let hour = time % 24;
    time /= 24;
    let day = (time % 31) + 1;
    time /= 31;
    let month = (time % 12) + 1;
    time /= 12;
    let year = (time + 2000) as i32;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        // Impossible encodings (e.g. day 31 in a 30-day month) collapse to
        // a sentinel rather than poisoning the whole batch.
        .unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(2000, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        })
}

/// Extract a NUL-terminated ASCII string.
fn ascii_field(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).trim().to_string()
}

/// Decode one 40-byte attendance record.
fn decode_attendance(data: &[u8]) -> RawPunch {
    let emp_no = ascii_field(&data[2..11]);
    let in_out_mode = data[12];
    let time_val = u32::from_le_bytes([data[27], data[28], data[29], data[30]]);
    RawPunch {
        emp_no,
        punch_time: parse_zk_time(time_val),
        state: PunchState::from_mode(in_out_mode),
        work_code: None,
    }
}

/// Decode one 72-byte user record.
fn decode_user(data: &[u8]) -> EmployeeRecord {
    EmployeeRecord {
        emp_no: ascii_field(&data[48..57]),
        emp_name: ascii_field(&data[11..35]),
    }
}

/// Encode one 72-byte user record for upload.
fn encode_user(employee: &EmployeeRecord) -> Vec<u8> {
    let mut record = vec![0u8; USER_RECORD_SIZE];
    let uid: u16 = employee.emp_no.parse().unwrap_or(0);
    record[0..2].copy_from_slice(&uid.to_le_bytes());
    let name = employee.emp_name.as_bytes();
    let name_len = name.len().min(24);
    record[11..11 + name_len].copy_from_slice(&name[..name_len]);
    let emp_no = employee.emp_no.as_bytes();
    let emp_no_len = emp_no.len().min(9);
    record[48..48 + emp_no_len].copy_from_slice(&emp_no[..emp_no_len]);
    record
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Production [`DeviceCapability`] speaking the ZKTeco TCP protocol.
pub struct ZkTecoCapability {
    timeout: Duration,
}

impl ZkTecoCapability {
    /// Every socket operation against a device is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl DeviceCapability for ZkTecoCapability {
    async fn connect(&self, ip: &str, port: u16) -> Result<Box<dyn DeviceSession>, DeviceError> {
        let addr = format!("{ip}:{port}");

        let stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DeviceError::ConnectFailed {
                addr: addr.clone(),
                reason: format!("connect timed out after {:?}", self.timeout),
            })?
            .map_err(|e| DeviceError::ConnectFailed {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;

        let mut session = ZkSession {
            addr: addr.clone(),
            stream,
            session_id: 0,
            reply_id: 0,
            timeout: self.timeout,
        };

        let (reply, _) = session.execute(CMD_CONNECT, &[]).await.map_err(|e| {
            DeviceError::ConnectFailed {
                addr: addr.clone(),
                reason: e.to_string(),
            }
        })?;

        if reply.command == CMD_ACK_UNAUTH {
            return Err(DeviceError::ConnectFailed {
                addr,
                reason: "device requires a communication key".to_string(),
            });
        }
        session.session_id = reply.session_id;

        tracing::debug!(addr = %session.addr, "Device session established");
        Ok(Box::new(session))
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct ReplyHeader {
    command: u16,
    session_id: u16,
}

/// One open TCP session with a terminal.
struct ZkSession {
    addr: String,
    stream: TcpStream,
    session_id: u16,
    reply_id: u16,
    timeout: Duration,
}

impl ZkSession {
    /// Send a command and read the next non-event reply frame.
    async fn execute(&mut self, command: u16, data: &[u8]) -> Result<(ReplyHeader, Vec<u8>), DeviceError> {
        if command != CMD_CONNECT {
            self.reply_id = self.reply_id.wrapping_add(1);
        }
        let frame = encode_frame(command, self.session_id, self.reply_id, data);
        timeout(self.timeout, self.stream.write_all(&frame))
            .await
            .map_err(|_| DeviceError::Timeout(self.timeout))??;

        self.read_frame().await
    }

    /// Read one complete reply frame, skipping real-time event packets.
    async fn read_frame(&mut self) -> Result<(ReplyHeader, Vec<u8>), DeviceError> {
        loop {
            let mut prefix = [0u8; 8];
            timeout(self.timeout, self.stream.read_exact(&mut prefix))
                .await
                .map_err(|_| DeviceError::Timeout(self.timeout))??;

            if prefix[0..4] != TCP_PREFIX {
                return Err(DeviceError::Protocol(format!(
                    "unexpected transport prefix from {}",
                    self.addr
                )));
            }

            let inner_len = u16::from_le_bytes([prefix[4], prefix[5]]) as usize;
            if inner_len < 8 {
                return Err(DeviceError::Protocol(format!(
                    "truncated packet ({inner_len} bytes) from {}",
                    self.addr
                )));
            }

            let mut inner = vec![0u8; inner_len];
            timeout(self.timeout, self.stream.read_exact(&mut inner))
                .await
                .map_err(|_| DeviceError::Timeout(self.timeout))??;

            let header = ReplyHeader {
                command: u16::from_le_bytes([inner[0], inner[1]]),
                session_id: u16::from_le_bytes([inner[4], inner[5]]),
            };

            // Devices push attendance events over the same socket; they are
            // not replies and must not be consumed as one.
            if header.command == CMD_REG_EVENT {
                continue;
            }

            return Ok((header, inner[8..].to_vec()));
        }
    }

    /// Run a buffered bulk read (attendance log or user table).
    ///
    /// Small tables arrive in a single `CMD_DATA` reply. Large tables are
    /// announced with a size and then pulled in checksummed chunks that we
    /// acknowledge with `CMD_DATA_RDY` requests.
    async fn read_bulk(&mut self, request: &[u8]) -> Result<Vec<u8>, DeviceError> {
        let (reply, data) = self.execute(CMD_DATA_WRRQ, request).await?;

        let total_size = match reply.command {
            CMD_DATA => return Ok(data),
            CMD_ACK_OK | CMD_PREPARE_DATA => {
                if data.len() < 5 {
                    return Err(DeviceError::Protocol(
                        "prepare-data reply too short".to_string(),
                    ));
                }
                u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize
            }
            other => {
                return Err(DeviceError::Protocol(format!(
                    "unexpected reply {other} to data request"
                )));
            }
        };

        let mut payload = Vec::with_capacity(total_size);
        let mut offset = 0usize;

        while offset < total_size {
            let chunk_size = (total_size - offset).min(MAX_CHUNK);
            let mut req = [0u8; 8];
            req[0..4].copy_from_slice(&(offset as u32).to_le_bytes());
            req[4..8].copy_from_slice(&(chunk_size as u32).to_le_bytes());

            let (mut reply, mut data) = self.execute(CMD_DATA_RDY, &req).await?;
            // The chunk may be preceded by a prepare-data notice.
            while reply.command == CMD_PREPARE_DATA || reply.command == CMD_ACK_OK {
                (reply, data) = self.read_frame().await?;
            }

            let mut received = 0usize;
            loop {
                if reply.command != CMD_DATA {
                    return Err(DeviceError::Protocol(format!(
                        "unexpected reply {} during chunk transfer",
                        reply.command
                    )));
                }
                received += data.len();
                payload.extend_from_slice(&data);
                if received >= chunk_size {
                    break;
                }
                (reply, data) = self.read_frame().await?;
            }

            offset += chunk_size;
        }

        // Release the device-side buffer; best effort.
        let _ = self.execute(CMD_FREE_DATA, &[]).await;

        Ok(payload)
    }
}

#[async_trait]
impl DeviceSession for ZkSession {
    async fn read_punch_log(&mut self) -> Result<Vec<RawPunch>, DeviceError> {
        let data = self.read_bulk(GET_ATTENDANCE_LOGS).await?;
        if data.len() < 4 {
            return Ok(Vec::new());
        }
        // The first four bytes repeat the table size.
        let records = data[4..]
            .chunks_exact(ATT_RECORD_SIZE)
            .map(decode_attendance)
            .collect();
        Ok(records)
    }

    async fn read_employees(&mut self) -> Result<Vec<EmployeeRecord>, DeviceError> {
        let data = self.read_bulk(GET_USERS).await?;
        if data.len() < 4 {
            return Ok(Vec::new());
        }
        let employees = data[4..]
            .chunks_exact(USER_RECORD_SIZE)
            .map(decode_user)
            .collect();
        Ok(employees)
    }

    async fn upload_employee(&mut self, employee: &EmployeeRecord) -> Result<(), DeviceError> {
        let record = encode_user(employee);
        let (reply, _) = self.execute(CMD_USER_WRQ, &record).await?;
        if reply.command != CMD_ACK_OK {
            return Err(DeviceError::Protocol(format!(
                "user upload rejected with reply {}",
                reply.command
            )));
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.execute(CMD_EXIT, &[]).await {
            tracing::debug!(addr = %self.addr, error = %e, "Device exit command failed");
        }
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(addr = %self.addr, error = %e, "Socket shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Checksum / framing
    // -----------------------------------------------------------------------

    #[test]
    fn frame_layout_is_prefix_header_data() {
        let frame = encode_frame(CMD_CONNECT, 0, 0, &[]);
        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[0..4], &TCP_PREFIX);
        // Inner length.
        assert_eq!(u16::from_le_bytes([frame[4], frame[5]]), 8);
        // Command.
        assert_eq!(u16::from_le_bytes([frame[8], frame[9]]), CMD_CONNECT);
    }

    #[test]
    fn frame_checksum_covers_wire_reply_id() {
        let frame = encode_frame(CMD_DATA_WRRQ, 7, 3, &[0x01]);
        let inner = &frame[8..];
        // Zero out the checksum field and recompute.
        let mut scratch = inner.to_vec();
        scratch[2] = 0;
        scratch[3] = 0;
        let expected = checksum(&scratch);
        assert_eq!(u16::from_le_bytes([inner[2], inner[3]]), expected);
        // Wire reply id is reply_id + 1.
        assert_eq!(u16::from_le_bytes([inner[6], inner[7]]), 4);
    }

    // -----------------------------------------------------------------------
    // Timestamp decoding
    // -----------------------------------------------------------------------

    #[test]
    fn zk_time_zero_is_start_of_2000() {
        let t = parse_zk_time(0);
        assert_eq!(
            t,
            NaiveDate::from_ymd_opt(2000, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn zk_time_roundtrips_a_known_encoding() {
        // Encode 2025-06-03 07:30:15 the way the device does.
        let days = ((25u32 * 12 + (6 - 1)) * 31) + (3 - 1);
        let encoded = ((days * 24 + 7) * 60 + 30) * 60 + 15;
        let t = parse_zk_time(encoded);
        assert_eq!(
            t,
            NaiveDate::from_ymd_opt(2025, 6, 3)
                .unwrap()
                .and_hms_opt(7, 30, 15)
                .unwrap()
        );
    }

    // -----------------------------------------------------------------------
    // Record decoding
    // -----------------------------------------------------------------------

    #[test]
    fn attendance_record_decodes_employee_and_state() {
        let mut record = vec![0u8; ATT_RECORD_SIZE];
        record[2..5].copy_from_slice(b"100");
        record[12] = 1; // OUT
        record[27..31].copy_from_slice(&0u32.to_le_bytes());
        let punch = decode_attendance(&record);
        assert_eq!(punch.emp_no, "100");
        assert_eq!(punch.state, PunchState::Out);
    }

    #[test]
    fn user_record_roundtrips_through_encode_decode() {
        let employee = EmployeeRecord {
            emp_no: "42".to_string(),
            emp_name: "Alex".to_string(),
        };
        let encoded = encode_user(&employee);
        assert_eq!(encoded.len(), USER_RECORD_SIZE);
        let decoded = decode_user(&encoded);
        assert_eq!(decoded, employee);
    }

    #[test]
    fn overlong_names_are_truncated_to_field_width() {
        let employee = EmployeeRecord {
            emp_no: "12345678901234".to_string(),
            emp_name: "A very long name that does not fit the field".to_string(),
        };
        let encoded = encode_user(&employee);
        let decoded = decode_user(&encoded);
        assert_eq!(decoded.emp_no.len(), 9);
        assert_eq!(decoded.emp_name.len(), 24);
    }
}

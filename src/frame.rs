//! Canalyst-II CAN frame record
//!
//! This module provides the `CanMessage` struct, the 21-byte record that a
//! frame-buffer packet carries up to three of.
//!
//! Record layout (packed, little-endian):
//!
//! | offset | size | field       |
//! |--------|------|-------------|
//! | 0      | 4    | can_id      |
//! | 4      | 4    | time_stamp  |
//! | 8      | 1    | time_flag   |
//! | 9      | 1    | send_type   |
//! | 10     | 1    | remote      |
//! | 11     | 1    | extended    |
//! | 12     | 1    | data_len    |
//! | 13     | 8    | data        |

use std::time::Duration;

use crate::constants::{CAN_MAX_DLEN, FRAME_RECORD_SIZE, SEND_TYPE_ECHO, SEND_TYPE_NO_RETRY};
use crate::error::{CanalystError, Result};

/// One CAN frame inside a frame-buffer packet
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CanMessage {
    /// CAN identifier (11 or 29 bits, no flag bits)
    pub can_id: u32,
    /// Timestamp in units of 100 us
    pub time_stamp: u32,
    /// Non-zero when `time_stamp` is valid
    pub time_flag: u8,
    /// Logical OR of `SEND_TYPE_*` flags
    pub send_type: u8,
    /// Non-zero for a remote frame
    pub remote: u8,
    /// Non-zero when `can_id` is a 29-bit extended identifier
    pub extended: u8,
    /// Number of valid bytes in `data`
    pub data_len: u8,
    /// Frame data; bytes past `data_len` are zero
    pub data: [u8; CAN_MAX_DLEN],
}

impl CanMessage {
    /// Create a new data frame with a standard identifier
    ///
    /// Fails with `DataTooLong` if `data` is longer than 8 bytes.
    pub fn new(can_id: u32, data: &[u8]) -> Result<Self> {
        let mut message = Self {
            can_id,
            ..Self::default()
        };
        message.set_data(data)?;
        Ok(message)
    }

    /// Create a new data frame with an extended (29-bit) identifier
    pub fn new_extended(can_id: u32, data: &[u8]) -> Result<Self> {
        let mut message = Self::new(can_id, data)?;
        message.extended = 1;
        Ok(message)
    }

    /// Create a new remote frame requesting `dlc` bytes
    pub fn new_remote(can_id: u32, dlc: u8) -> Result<Self> {
        if dlc as usize > CAN_MAX_DLEN {
            return Err(CanalystError::DataTooLong { len: dlc as usize });
        }
        Ok(Self {
            can_id,
            remote: 1,
            data_len: dlc,
            ..Self::default()
        })
    }

    /// Replace the frame data, zeroing unused bytes
    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > CAN_MAX_DLEN {
            return Err(CanalystError::DataTooLong { len: data.len() });
        }
        self.data = [0u8; CAN_MAX_DLEN];
        self.data[..data.len()].copy_from_slice(data);
        self.data_len = data.len() as u8;
        Ok(())
    }

    /// Ask the adapter not to retry a failed transmission
    pub fn no_retry(mut self) -> Self {
        self.send_type |= SEND_TYPE_NO_RETRY;
        self
    }

    /// Ask the adapter to echo the frame back as RX
    pub fn echo(mut self) -> Self {
        self.send_type |= SEND_TYPE_ECHO;
        self
    }

    /// Check if this is an extended ID frame (29-bit)
    pub fn is_extended_id(&self) -> bool {
        self.extended != 0
    }

    /// Check if this is a remote transmission request
    pub fn is_remote_frame(&self) -> bool {
        self.remote != 0
    }

    /// Timestamp, if the adapter marked it valid
    pub fn timestamp(&self) -> Option<Duration> {
        if self.time_flag == 0 {
            return None;
        }
        Some(Duration::from_micros(self.time_stamp as u64 * 100))
    }

    /// Get frame data as a slice
    ///
    /// A `data_len` above 8 from the wire is clamped when slicing only.
    pub fn data(&self) -> &[u8] {
        &self.data[..(self.data_len as usize).min(CAN_MAX_DLEN)]
    }

    /// Pack into the 21-byte record layout
    pub fn pack(&self) -> [u8; FRAME_RECORD_SIZE] {
        let mut buf = [0u8; FRAME_RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.can_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.time_stamp.to_le_bytes());
        buf[8] = self.time_flag;
        buf[9] = self.send_type;
        buf[10] = self.remote;
        buf[11] = self.extended;
        buf[12] = self.data_len;
        buf[13..21].copy_from_slice(&self.data);
        buf
    }

    /// Unpack from a 21-byte record
    pub fn unpack(data: &[u8; FRAME_RECORD_SIZE]) -> Self {
        let mut payload = [0u8; CAN_MAX_DLEN];
        payload.copy_from_slice(&data[13..21]);
        Self {
            can_id: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            time_stamp: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            time_flag: data[8],
            send_type: data[9],
            remote: data[10],
            extended: data[11],
            data_len: data[12],
            data: payload,
        }
    }
}

impl std::fmt::Display for CanMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data_str = if self.is_remote_frame() {
            "remote request".to_string()
        } else {
            self.data()
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ")
        };

        if self.is_extended_id() {
            write!(f, "{:08X}   [{}]  {}", self.can_id, self.data_len, data_str)
        } else {
            write!(f, "{:>8X}   [{}]  {}", self.can_id, self.data_len, data_str)
        }
    }
}

impl std::fmt::Debug for CanMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanMessage")
            .field("can_id", &format_args!("0x{:08X}", self.can_id))
            .field("time_stamp", &self.time_stamp)
            .field("time_flag", &self.time_flag)
            .field("send_type", &format_args!("0x{:02X}", self.send_type))
            .field("remote", &self.is_remote_frame())
            .field("extended", &self.is_extended_id())
            .field("data", &self.data())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let data = [0x40, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let message = CanMessage::new(0x610, &data).unwrap();

        assert_eq!(message.can_id, 0x610);
        assert!(!message.is_extended_id());
        assert!(!message.is_remote_frame());
        assert_eq!(message.data_len, 8);
        assert_eq!(message.data(), &data);
    }

    #[test]
    fn test_data_too_long_is_rejected() {
        let data = [0u8; 9];
        let err = CanMessage::new(0x123, &data).unwrap_err();
        assert!(matches!(err, CanalystError::DataTooLong { len: 9 }));
        assert!(CanMessage::new_remote(0x123, 9).is_err());
    }

    #[test]
    fn test_short_data_zero_fills() {
        let mut message = CanMessage::new(0x1, &[0xFF; 8]).unwrap();
        message.set_data(&[0xAA, 0xBB]).unwrap();
        assert_eq!(message.data, [0xAA, 0xBB, 0, 0, 0, 0, 0, 0]);
        assert_eq!(message.data(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_send_type_flags() {
        let message = CanMessage::new(0x1, &[]).unwrap().no_retry().echo();
        assert_eq!(message.send_type, SEND_TYPE_NO_RETRY | SEND_TYPE_ECHO);
    }

    #[test]
    fn test_pack_layout() {
        let mut message = CanMessage::new_extended(0x1234_5678, &[1, 2, 3]).unwrap();
        message.time_stamp = 0x0A0B_0C0D;
        message.time_flag = 1;
        let packed = message.pack();

        assert_eq!(packed[0..4], [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(packed[4..8], [0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(packed[8], 1); // time_flag
        assert_eq!(packed[9], 0); // send_type
        assert_eq!(packed[10], 0); // remote
        assert_eq!(packed[11], 1); // extended
        assert_eq!(packed[12], 3); // data_len
        assert_eq!(packed[13..21], [1, 2, 3, 0, 0, 0, 0, 0]);

        assert_eq!(CanMessage::unpack(&packed), message);
    }

    #[test]
    fn test_timestamp() {
        let mut message = CanMessage::default();
        message.time_stamp = 25;
        assert_eq!(message.timestamp(), None);
        message.time_flag = 1;
        assert_eq!(message.timestamp(), Some(Duration::from_micros(2500)));
    }

    #[test]
    fn test_display() {
        let message = CanMessage::new(0x7FF, &[0x12, 0x34]).unwrap();
        assert_eq!(message.to_string(), "     7FF   [2]  12 34");
        let remote = CanMessage::new_remote(0x7FF, 0).unwrap();
        assert_eq!(remote.to_string(), "     7FF   [0]  remote request");
    }
}

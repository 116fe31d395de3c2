//! Canalyst-II packet codec
//!
//! Every exchange with the adapter moves exactly one 64-byte packet. The same
//! 64 bytes are read under one of two layouts, and nothing in the bytes says
//! which one applies; the caller picks the view that matches the exchange.
//!
//! Frame-buffer view:
//!
//! | offset | size   | field                    |
//! |--------|--------|--------------------------|
//! | 0      | 1      | count (0-3)              |
//! | 1      | 3 x 21 | [`CanMessage`] records   |
//!
//! Command view (all words little-endian `u32`):
//!
//! | offset | init       | message status | CAN status      |
//! |--------|------------|----------------|-----------------|
//! | 0      | command    | command        | command         |
//! | 4      | acc_code   | rx_pending     | err_interrupt   |
//! | 8      | acc_mask   | tx_pending     | reg_mode        |
//! | 12     | reserved   |                | reg_status      |
//! | 16     | filter     |                | reg_al_capture  |
//! | 20     | reserved   |                | reg_ec_capture  |
//! | 24     | timing[0]  |                | reg_ew_limit    |
//! | 28     | timing[1]  |                | reg_re_counter  |
//! | 32     | mode       |                | reg_te_counter  |
//! | 36     | flag (=1)  |                |                 |

use crate::bitrate::Bitrate;
use crate::constants::*;
use crate::error::{CanalystError, Result};
use crate::frame::CanMessage;

const _: () = assert!(std::mem::size_of::<Packet>() == PACKET_SIZE);
const _: () = assert!(1 + FRAMES_PER_PACKET * FRAME_RECORD_SIZE == PACKET_SIZE);
const _: () = assert!(PAYLOAD_OFFSET + PAYLOAD_WORDS * 4 == PACKET_SIZE);
const _: () = assert!(INIT_FLAG_OFFSET == PAYLOAD_OFFSET + 8 * 4);

/// One 64-byte protocol packet
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; PACKET_SIZE]);

impl Default for Packet {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Packet {
    /// All-zero packet
    pub const fn zeroed() -> Self {
        Self([0u8; PACKET_SIZE])
    }

    /// Zeroed command packet carrying only a command code
    pub fn command(code: u32) -> Self {
        let mut packet = Self::zeroed();
        packet.write_u32(COMMAND_OFFSET, code);
        packet
    }

    /// Wrap raw packet bytes
    pub const fn from_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw packet bytes
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }

    /// Mutable raw packet bytes (used as the receive buffer of a transfer)
    pub fn as_bytes_mut(&mut self) -> &mut [u8; PACKET_SIZE] {
        &mut self.0
    }

    /// Command code under the command view
    pub fn command_code(&self) -> u32 {
        self.read_u32(COMMAND_OFFSET)
    }

    /// Payload word `index` (0-14) under the command view
    pub fn payload_word(&self, index: usize) -> Option<u32> {
        (index < PAYLOAD_WORDS).then(|| self.read_u32(PAYLOAD_OFFSET + index * 4))
    }

    /// Pending counts under the message-status view
    pub fn message_status(&self) -> MessageStatus {
        MessageStatus::unpack(self)
    }

    /// Register snapshot under the CAN-status view
    pub fn can_status(&self) -> CanStatus {
        CanStatus::unpack(self)
    }

    /// Frames under the frame-buffer view
    pub fn frame_buffer(&self) -> FrameBuffer {
        FrameBuffer::unpack(self)
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let b = &self.0[offset..offset + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.0[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Packet({})", hex::encode(self.0))
    }
}

/// Frame-buffer view: up to three CAN frames
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameBuffer {
    count: u8,
    messages: [CanMessage; FRAMES_PER_PACKET],
}

impl FrameBuffer {
    /// Create an empty frame buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame buffer holding `messages`
    pub fn from_messages(messages: &[CanMessage]) -> Result<Self> {
        let mut buffer = Self::new();
        for message in messages {
            buffer.push(*message)?;
        }
        Ok(buffer)
    }

    /// Append a frame; fails with `TooManyFrames` past three
    ///
    /// A message whose `data_len` was set above 8 by hand is rejected with
    /// `DataTooLong`.
    pub fn push(&mut self, message: CanMessage) -> Result<()> {
        let len = message.data_len as usize;
        if len > CAN_MAX_DLEN {
            return Err(CanalystError::DataTooLong { len });
        }
        let index = self.count as usize;
        if index >= FRAMES_PER_PACKET {
            return Err(CanalystError::TooManyFrames);
        }
        self.messages[index] = message;
        self.count += 1;
        Ok(())
    }

    /// Count byte as carried on the wire
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Number of usable frames
    pub fn len(&self) -> usize {
        (self.count as usize).min(FRAMES_PER_PACKET)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn messages(&self) -> &[CanMessage] {
        &self.messages[..self.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanMessage> {
        self.messages().iter()
    }

    /// Pack into a zeroed packet
    pub fn pack(&self) -> Packet {
        let mut packet = Packet::zeroed();
        packet.0[0] = self.count;
        for (index, message) in self.messages().iter().enumerate() {
            let offset = 1 + index * FRAME_RECORD_SIZE;
            packet.0[offset..offset + FRAME_RECORD_SIZE].copy_from_slice(&message.pack());
        }
        packet
    }

    /// Unpack from a received packet
    ///
    /// All three records are decoded; `messages()` exposes only `count` of them.
    pub fn unpack(packet: &Packet) -> Self {
        let mut messages = [CanMessage::default(); FRAMES_PER_PACKET];
        for (index, message) in messages.iter_mut().enumerate() {
            let offset = 1 + index * FRAME_RECORD_SIZE;
            let mut record = [0u8; FRAME_RECORD_SIZE];
            record.copy_from_slice(&packet.0[offset..offset + FRAME_RECORD_SIZE]);
            *message = CanMessage::unpack(&record);
        }
        Self {
            count: packet.0[0],
            messages,
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("count", &self.count)
            .field("messages", &self.messages())
            .finish()
    }
}

/// Init command parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitConfig {
    /// Acceptance code
    pub acc_code: u32,
    /// Acceptance mask (`INIT_ACC_MASK_ALL` accepts every identifier)
    pub acc_mask: u32,
    /// Filter mode (`INIT_FILTER_SINGLE` for a single filter)
    pub filter: u32,
    /// Timing register pair, see [`Bitrate::timing`]
    pub timing: [u32; 2],
    /// Operating mode (`INIT_MODE_NORMAL` for normal operation)
    pub mode: u32,
}

/// Accept-all single filter, normal mode, 500 kbps.
impl Default for InitConfig {
    fn default() -> Self {
        Self::new(Bitrate::Kbps500)
    }
}

impl InitConfig {
    /// Accept-all configuration at `bitrate`
    pub fn new(bitrate: Bitrate) -> Self {
        Self {
            acc_code: 0,
            acc_mask: INIT_ACC_MASK_ALL,
            filter: INIT_FILTER_SINGLE,
            timing: bitrate.timing(),
            mode: INIT_MODE_NORMAL,
        }
    }

    pub fn with_bitrate(mut self, bitrate: Bitrate) -> Self {
        self.timing = bitrate.timing();
        self
    }

    pub fn with_filter(mut self, acc_code: u32, acc_mask: u32, filter: u32) -> Self {
        self.acc_code = acc_code;
        self.acc_mask = acc_mask;
        self.filter = filter;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Pack into an init command packet, including the trailing flag word
    pub fn pack(&self) -> Packet {
        let mut packet = Packet::command(COMMAND_INIT);
        packet.write_u32(INIT_ACC_CODE_OFFSET, self.acc_code);
        packet.write_u32(INIT_ACC_MASK_OFFSET, self.acc_mask);
        packet.write_u32(INIT_FILTER_OFFSET, self.filter);
        packet.write_u32(INIT_TIMING_OFFSET, self.timing[0]);
        packet.write_u32(INIT_TIMING_OFFSET + 4, self.timing[1]);
        packet.write_u32(INIT_MODE_OFFSET, self.mode);
        packet.write_u32(INIT_FLAG_OFFSET, INIT_FLAG_VALUE);
        packet
    }
}

/// Message-status response: pending frame counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageStatus {
    /// Frames waiting to be read
    pub rx_pending: u32,
    /// Frames waiting to be transmitted
    pub tx_pending: u32,
}

impl MessageStatus {
    /// Request packet for a message-status query
    pub fn request() -> Packet {
        Packet::command(COMMAND_MESSAGE_STATUS)
    }

    pub fn unpack(packet: &Packet) -> Self {
        Self {
            rx_pending: packet.read_u32(STATUS_RX_PENDING_OFFSET),
            tx_pending: packet.read_u32(STATUS_TX_PENDING_OFFSET),
        }
    }

    /// Pack into a response packet (what the adapter sends back)
    pub fn pack(&self) -> Packet {
        let mut packet = Self::request();
        packet.write_u32(STATUS_RX_PENDING_OFFSET, self.rx_pending);
        packet.write_u32(STATUS_TX_PENDING_OFFSET, self.tx_pending);
        packet
    }
}

/// CAN-status response: controller register snapshot
///
/// The field order was inferred by matching the vendor DLL's status structure
/// to the packet words. It has not been checked against the firmware, so treat
/// the names as a best guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanStatus {
    pub err_interrupt: u32,
    pub reg_mode: u32,
    pub reg_status: u32,
    pub reg_al_capture: u32,
    pub reg_ec_capture: u32,
    pub reg_ew_limit: u32,
    /// RX error counter
    pub reg_re_counter: u32,
    /// TX error counter
    pub reg_te_counter: u32,
}

impl CanStatus {
    /// Request packet for a CAN-status query
    pub fn request() -> Packet {
        Packet::command(COMMAND_CAN_STATUS)
    }

    pub fn unpack(packet: &Packet) -> Self {
        let word = |index: usize| packet.read_u32(PAYLOAD_OFFSET + index * 4);
        Self {
            err_interrupt: word(0),
            reg_mode: word(1),
            reg_status: word(2),
            reg_al_capture: word(3),
            reg_ec_capture: word(4),
            reg_ew_limit: word(5),
            reg_re_counter: word(6),
            reg_te_counter: word(7),
        }
    }

    pub fn pack(&self) -> Packet {
        let mut packet = Self::request();
        let words = [
            self.err_interrupt,
            self.reg_mode,
            self.reg_status,
            self.reg_al_capture,
            self.reg_ec_capture,
            self.reg_ew_limit,
            self.reg_re_counter,
            self.reg_te_counter,
        ];
        for (index, word) in words.iter().enumerate() {
            packet.write_u32(PAYLOAD_OFFSET + index * 4, *word);
        }
        packet
    }
}

impl std::fmt::Display for CanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Error interrupt: 0x{:08x}\n\
             Mode: 0x{:08x}\n\
             Status: 0x{:08x}\n\
             Arbitration lost capture: 0x{:08x}\n\
             Error code capture: 0x{:08x}\n\
             Error warning limit: {}\n\
             RX Error Counter: {}\n\
             TX Error Counter: {}",
            self.err_interrupt,
            self.reg_mode,
            self.reg_status,
            self.reg_al_capture,
            self.reg_ec_capture,
            self.reg_ew_limit,
            self.reg_re_counter,
            self.reg_te_counter
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_view_is_one_packet() {
        let views = [
            Packet::zeroed(),
            Packet::command(COMMAND_START),
            InitConfig::default().pack(),
            MessageStatus::request(),
            CanStatus::default().pack(),
            FrameBuffer::new().pack(),
        ];
        for packet in views {
            assert_eq!(packet.as_bytes().len(), PACKET_SIZE);
        }
    }

    #[test]
    fn test_command_packet() {
        let packet = Packet::command(COMMAND_CLEAR_RX_BUFFER);
        assert_eq!(packet.as_bytes()[0..4], [0x05, 0, 0, 0]);
        assert!(packet.as_bytes()[4..].iter().all(|&b| b == 0));
        assert_eq!(packet.command_code(), COMMAND_CLEAR_RX_BUFFER);
    }

    #[test]
    fn test_init_packet_layout() {
        let config = InitConfig::new(Bitrate::Kbps125)
            .with_filter(0x0000_0001, 0x1234_5678, 0x02)
            .with_mode(0x03);
        let packet = config.pack();

        assert_eq!(packet.command_code(), COMMAND_INIT);
        assert_eq!(packet.payload_word(0), Some(0x0000_0001)); // acc_code
        assert_eq!(packet.payload_word(1), Some(0x1234_5678)); // acc_mask
        assert_eq!(packet.payload_word(2), Some(0)); // reserved
        assert_eq!(packet.payload_word(3), Some(0x02)); // filter
        assert_eq!(packet.payload_word(4), Some(0)); // reserved
        assert_eq!(packet.payload_word(5), Some(0x03)); // timing[0]
        assert_eq!(packet.payload_word(6), Some(0x1C)); // timing[1]
        assert_eq!(packet.payload_word(7), Some(0x03)); // mode
        assert_eq!(packet.payload_word(8), Some(INIT_FLAG_VALUE));
        for index in 9..PAYLOAD_WORDS {
            assert_eq!(packet.payload_word(index), Some(0));
        }
        assert_eq!(packet.payload_word(PAYLOAD_WORDS), None);
    }

    #[test]
    fn test_init_flag_for_any_parameters() {
        let configs = [
            InitConfig::default(),
            InitConfig::new(Bitrate::Kbps5).with_mode(0xFFFF_FFFF),
            InitConfig {
                acc_code: u32::MAX,
                acc_mask: 0,
                filter: u32::MAX,
                timing: [u32::MAX, u32::MAX],
                mode: u32::MAX,
            },
        ];
        for config in configs {
            let packet = config.pack();
            assert_eq!(packet.command_code(), 0x01);
            assert_eq!(packet.as_bytes()[36..40], [0x01, 0, 0, 0]);
        }
    }

    #[test]
    fn test_message_status_offsets() {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = 0x0A;
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&1001u32.to_le_bytes());
        let status = Packet::from_bytes(bytes).message_status();
        assert_eq!(status.rx_pending, 7);
        assert_eq!(status.tx_pending, 1001);
    }

    #[test]
    fn test_can_status_offsets() {
        let mut bytes = [0u8; PACKET_SIZE];
        for index in 0..8u32 {
            let offset = 4 + index as usize * 4;
            bytes[offset..offset + 4].copy_from_slice(&(index + 1).to_le_bytes());
        }
        let status = Packet::from_bytes(bytes).can_status();
        assert_eq!(status.err_interrupt, 1);
        assert_eq!(status.reg_mode, 2);
        assert_eq!(status.reg_ew_limit, 6);
        assert_eq!(status.reg_re_counter, 7);
        assert_eq!(status.reg_te_counter, 8);
    }

    #[test]
    fn test_frame_buffer_layout() {
        let first = CanMessage::new(0x610, &[0x40, 0x01]).unwrap();
        let second = CanMessage::new_extended(0x1ABC_DEF0, &[0xFF; 8]).unwrap();
        let buffer = FrameBuffer::from_messages(&[first, second]).unwrap();
        let packet = buffer.pack();
        let bytes = packet.as_bytes();

        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1..5], 0x610u32.to_le_bytes());
        assert_eq!(bytes[13], 2); // first data_len
        assert_eq!(bytes[14..16], [0x40, 0x01]);
        assert_eq!(bytes[22..26], 0x1ABC_DEF0u32.to_le_bytes());
        assert_eq!(bytes[34], 8); // second data_len
        assert!(bytes[43..].iter().all(|&b| b == 0)); // third record unused

        let decoded = packet.frame_buffer();
        assert_eq!(decoded.messages(), &[first, second]);
    }

    #[test]
    fn test_frame_buffer_rejects_fourth_frame() {
        let message = CanMessage::new(0x1, &[]).unwrap();
        let mut buffer = FrameBuffer::from_messages(&[message; 3]).unwrap();
        assert_eq!(buffer.len(), 3);
        assert!(matches!(
            buffer.push(message),
            Err(CanalystError::TooManyFrames)
        ));
    }

    #[test]
    fn test_frame_buffer_rejects_hand_set_data_len() {
        let mut message = CanMessage::new(0x1, &[0x01]).unwrap();
        message.data_len = 9;

        let mut buffer = FrameBuffer::new();
        assert!(matches!(
            buffer.push(message),
            Err(CanalystError::DataTooLong { len: 9 })
        ));
        assert!(buffer.is_empty());
        assert!(matches!(
            FrameBuffer::from_messages(&[message]),
            Err(CanalystError::DataTooLong { len: 9 })
        ));

        message.data_len = 8;
        buffer.push(message).unwrap();
        assert_eq!(buffer.pack().as_bytes()[13], 8);
    }

    #[test]
    fn test_frame_buffer_bad_count_from_wire() {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = 200;
        let buffer = Packet::from_bytes(bytes).frame_buffer();
        assert_eq!(buffer.count(), 200);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_views_do_not_change_bytes() {
        let packet = InitConfig::default().pack();
        let before = *packet.as_bytes();
        let _ = packet.message_status();
        let _ = packet.can_status();
        let _ = packet.frame_buffer();
        assert_eq!(*packet.as_bytes(), before);
    }
}

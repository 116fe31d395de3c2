//! Canalyst-II protocol constants
//!
//! This module contains the command codes, endpoint addresses, packet layout
//! sizes and USB identifiers used by the Canalyst-II packet protocol.

use std::time::Duration;

// ============================================================================
// Packet Layout
// ============================================================================

/// Size of every packet exchanged with the adapter
pub const PACKET_SIZE: usize = 64;
/// Maximum number of CAN frames carried by one frame-buffer packet
pub const FRAMES_PER_PACKET: usize = 3;
/// Size of one frame record inside a frame-buffer packet
pub const FRAME_RECORD_SIZE: usize = 21;
/// Maximum data length of a classic CAN frame
pub const CAN_MAX_DLEN: usize = 8;

/// Byte offset of the command code in a command packet
pub const COMMAND_OFFSET: usize = 0;
/// Byte offset of the first payload word in a command packet
pub const PAYLOAD_OFFSET: usize = 4;
/// Number of 32-bit words in a command payload
pub const PAYLOAD_WORDS: usize = 15;

// Init command payload words, as byte offsets into the packet.
/// Acceptance code
pub const INIT_ACC_CODE_OFFSET: usize = PAYLOAD_OFFSET;
/// Acceptance mask
pub const INIT_ACC_MASK_OFFSET: usize = PAYLOAD_OFFSET + 4;
/// Filter mode (one reserved word precedes it)
pub const INIT_FILTER_OFFSET: usize = PAYLOAD_OFFSET + 12;
/// First timing register word (one reserved word precedes it)
pub const INIT_TIMING_OFFSET: usize = PAYLOAD_OFFSET + 20;
/// Operating mode
pub const INIT_MODE_OFFSET: usize = PAYLOAD_OFFSET + 28;
/// Flag word the firmware expects one word past `mode`
pub const INIT_FLAG_OFFSET: usize = INIT_MODE_OFFSET + 4;
/// Value of the init flag word
pub const INIT_FLAG_VALUE: u32 = 0x01;

/// Pending RX count in a message-status response
pub const STATUS_RX_PENDING_OFFSET: usize = PAYLOAD_OFFSET;
/// Pending TX count in a message-status response
pub const STATUS_TX_PENDING_OFFSET: usize = PAYLOAD_OFFSET + 4;

// ============================================================================
// Command Codes
// ============================================================================

/// Initialize a channel (acceptance filter, timing, mode)
pub const COMMAND_INIT: u32 = 0x01;
/// Start a channel
pub const COMMAND_START: u32 = 0x02;
/// Stop a channel
pub const COMMAND_STOP: u32 = 0x03;
/// Discard all frames waiting in the RX buffer
pub const COMMAND_CLEAR_RX_BUFFER: u32 = 0x05;
/// Query pending RX/TX message counts
pub const COMMAND_MESSAGE_STATUS: u32 = 0x0A;
/// Query the CAN controller status registers
pub const COMMAND_CAN_STATUS: u32 = 0x0B;
/// Pre-initialization (seen on the wire, not used by this driver)
pub const COMMAND_PREINIT: u32 = 0x13;

// ============================================================================
// Frame Record Flags
// ============================================================================

/// Drop the message if the first transmission attempt fails
pub const SEND_TYPE_NO_RETRY: u8 = 0x01;
/// Echo the message back as RX (echoed even if sending fails)
pub const SEND_TYPE_ECHO: u8 = 0x02;

// ============================================================================
// Buffer Capacities
// ============================================================================

/// Adapter TX buffer capacity in frames
pub const WRITE_BUFFER_CAPACITY: u32 = 1000;
/// Adapter RX buffer capacity in frames
pub const READ_BUFFER_CAPACITY: u32 = 2000;

// ============================================================================
// USB Endpoints
// ============================================================================

/// Direction bit for device-to-host transfers
pub const ENDPOINT_IN: u8 = 0x80;
/// Direction bit for host-to-device transfers
pub const ENDPOINT_OUT: u8 = 0x00;

/// Number of CAN channels on the adapter
pub const CHANNEL_COUNT: usize = 2;
/// Command endpoint number, indexed by channel
pub const CHANNEL_COMMAND_ENDPOINTS: [u8; CHANNEL_COUNT] = [0x02, 0x04];
/// Data (message) endpoint number, indexed by channel
pub const CHANNEL_DATA_ENDPOINTS: [u8; CHANNEL_COUNT] = [0x01, 0x03];

// ============================================================================
// USB Vendor/Product IDs
// ============================================================================

/// Microchip vendor ID (the adapter is built around a PIC32)
pub const USB_ID_VENDOR: u16 = 0x04D8;
/// Canalyst-II product ID
pub const USB_ID_PRODUCT: u16 = 0x0053;

/// USB configuration the adapter must run in
pub const USB_CONFIGURATION: u8 = 1;
/// USB interface carrying all bulk endpoints
pub const USB_INTERFACE: u8 = 0;

// ============================================================================
// Timeouts
// ============================================================================

/// Default timeout applied to every bulk transfer
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

// ============================================================================
// Init Command Values
// ============================================================================

/// Acceptance mask that lets every identifier through
pub const INIT_ACC_MASK_ALL: u32 = 0xFFFF_FFFF;
/// Single-filter mode (receive all packets with the open mask)
pub const INIT_FILTER_SINGLE: u32 = 0x01;
/// Normal operating mode
pub const INIT_MODE_NORMAL: u32 = 0x00;

//! Canalyst-II Protocol Implementation for Rust
//!
//! This crate provides a userspace driver for the Canalyst-II USB-CAN analyzer
//! (and compatible clones). The adapter speaks a fixed 64-byte packet protocol
//! over per-channel bulk endpoints; this crate encodes those packets, runs the
//! transfers, and decodes the answers.
//!
//! # Features
//!
//! - Two independent CAN channels, up to 1 Mbps
//! - Up to three frames per transfer
//! - TX buffer flushing with a deadline, RX buffer clearing
//! - CAN controller status snapshots
//! - Pluggable bulk transport (any `rusb` handle, or your own)
//!
//! # Example
//!
//! ```no_run
//! use canalyst_ii::{Bitrate, CanMessage, CanalystError, CanalystII, Channel, FrameBuffer, InitConfig};
//!
//! fn main() -> canalyst_ii::Result<()> {
//!     let mut dev = CanalystII::open()?;
//!     let channel = Channel::Zero;
//!
//!     // Accept every frame at 500 kbps
//!     dev.init(channel, &InitConfig::new(Bitrate::Kbps500))?;
//!     dev.start(channel)?;
//!
//!     // Send a frame
//!     let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
//!     let frames = FrameBuffer::from_messages(&[CanMessage::new(0x7FF, &data)?])?;
//!     dev.write(channel, &frames)?;
//!
//!     // Read frames
//!     loop {
//!         match dev.read(channel) {
//!             Ok(frames) => {
//!                 for frame in frames.iter() {
//!                     println!("RX  {}", frame);
//!                 }
//!             }
//!             Err(CanalystError::BufferEmpty) => continue,
//!             Err(e) => return Err(e),
//!         }
//!     }
//! }
//! ```
//!
//! # Supported Devices
//!
//! - Canalyst-II (VID: 0x04D8, PID: 0x0053)

pub mod bitrate;
pub mod buffer;
pub mod channel;
pub mod constants;
pub mod device;
pub mod error;
pub mod frame;
pub mod packet;
pub mod transaction;
pub mod transport;
pub mod usb;

// Re-export main types at crate root
pub use constants::{
    // Command codes
    COMMAND_CAN_STATUS,
    COMMAND_CLEAR_RX_BUFFER,
    COMMAND_INIT,
    COMMAND_MESSAGE_STATUS,
    COMMAND_PREINIT,
    COMMAND_START,
    COMMAND_STOP,
    // Init values
    INIT_ACC_MASK_ALL,
    INIT_FILTER_SINGLE,
    INIT_MODE_NORMAL,
    // Packet size
    PACKET_SIZE,
    // Buffer capacities
    READ_BUFFER_CAPACITY,
    // Send type flags
    SEND_TYPE_ECHO,
    SEND_TYPE_NO_RETRY,
    // USB IDs
    USB_ID_PRODUCT,
    USB_ID_VENDOR,
    WRITE_BUFFER_CAPACITY,
};

pub use bitrate::Bitrate;
pub use channel::{command_endpoint, data_endpoint, Channel};
pub use device::CanalystII;
pub use error::{describe, CanalystError, ErrorKind, Result};
pub use frame::CanMessage;
pub use packet::{CanStatus, FrameBuffer, InitConfig, MessageStatus, Packet};
pub use transport::BulkTransport;
pub use usb::UsbDevice;

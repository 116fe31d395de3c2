//! Canalyst-II device implementation
//!
//! This module provides the `CanalystII` struct, the command interface of the
//! adapter. It owns the bulk transport and the transaction timeout; the
//! transaction and buffer-management halves live in `transaction` and `buffer`.

use std::time::Duration;

use log::debug;

use crate::channel::Channel;
use crate::constants::{COMMAND_START, COMMAND_STOP, DEFAULT_TIMEOUT};
use crate::error::Result;
use crate::packet::{CanStatus, FrameBuffer, InitConfig, Packet};
use crate::transport::BulkTransport;
use crate::usb::UsbDevice;

/// Canalyst-II command interface
///
/// Every operation blocks until its transfers complete, fail, or time out.
/// Nothing is queued or retried; concurrent use must be serialized by the
/// caller.
///
/// # Example
///
/// ```no_run
/// use canalyst_ii::{Bitrate, CanMessage, CanalystII, Channel, FrameBuffer, InitConfig};
///
/// let mut dev = CanalystII::open()?;
/// let channel = Channel::Zero;
///
/// dev.init(channel, &InitConfig::new(Bitrate::Kbps125))?;
/// dev.start(channel)?;
///
/// let frames = FrameBuffer::from_messages(&[CanMessage::new(0x610, &[0x40, 0x01])?])?;
/// dev.write(channel, &frames)?;
///
/// dev.stop(channel)?;
/// dev.close()?;
/// # Ok::<(), canalyst_ii::CanalystError>(())
/// ```
pub struct CanalystII<T: BulkTransport = UsbDevice> {
    /// Bulk transport to the adapter
    pub(crate) transport: T,
    /// Timeout for every bulk transfer (zero waits forever)
    pub(crate) timeout: Duration,
}

impl<T: BulkTransport> CanalystII<T> {
    /// Create a command interface over an open transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the transaction timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the transaction timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the transaction timeout (zero waits forever)
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the underlying transport mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the underlying transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Configure a channel's acceptance filter, bit timing and mode
    ///
    /// The channel must be stopped. No response is read.
    pub fn init(&mut self, channel: Channel, config: &InitConfig) -> Result<()> {
        debug!(
            "{}: init timing=[0x{:02x}, 0x{:02x}] mode={}",
            channel, config.timing[0], config.timing[1], config.mode
        );
        let request = config.pack();
        self.transact(channel.command_endpoint(), Some(&request), None)
    }

    /// Start a channel
    pub fn start(&mut self, channel: Channel) -> Result<()> {
        debug!("{}: start", channel);
        let request = Packet::command(COMMAND_START);
        self.transact(channel.command_endpoint(), Some(&request), None)
    }

    /// Stop a channel
    pub fn stop(&mut self, channel: Channel) -> Result<()> {
        debug!("{}: stop", channel);
        let request = Packet::command(COMMAND_STOP);
        self.transact(channel.command_endpoint(), Some(&request), None)
    }

    /// Queue up to three frames for transmission
    ///
    /// Fails with `BufferOverflow`, without sending anything, when the
    /// adapter's TX buffer already holds more than its capacity.
    pub fn write(&mut self, channel: Channel, frames: &FrameBuffer) -> Result<()> {
        self.admit_write(channel)?;
        let request = frames.pack();
        self.transact(channel.data_endpoint(), Some(&request), None)
    }

    /// Read one packet of received frames
    ///
    /// Fails with `BufferEmpty`, without reading the data endpoint, when the
    /// adapter reports nothing pending.
    pub fn read(&mut self, channel: Channel) -> Result<FrameBuffer> {
        self.check_read(channel)?;
        let mut response = Packet::zeroed();
        self.transact(channel.data_endpoint(), None, Some(&mut response))?;
        Ok(response.frame_buffer())
    }

    /// Read the CAN controller status of a channel
    pub fn get_status(&mut self, channel: Channel) -> Result<CanStatus> {
        let request = CanStatus::request();
        let mut response = CanStatus::request();
        self.transact(channel.command_endpoint(), Some(&request), Some(&mut response))?;
        Ok(response.can_status())
    }
}

impl CanalystII<UsbDevice> {
    /// Open the first Canalyst-II on the bus
    pub fn open() -> Result<Self> {
        Ok(Self::new(UsbDevice::open()?))
    }

    /// Release the USB interface and close the device
    pub fn close(self) -> Result<()> {
        self.transport.close()
    }
}

impl<T: BulkTransport> std::fmt::Debug for CanalystII<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanalystII")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

//! Adapter buffer management
//!
//! Every check here is a message-status query on the channel's command
//! endpoint, which reports how many frames wait in the adapter's RX and TX
//! buffers.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::channel::Channel;
use crate::constants::{COMMAND_CLEAR_RX_BUFFER, WRITE_BUFFER_CAPACITY};
use crate::device::CanalystII;
use crate::error::{CanalystError, Result};
use crate::packet::{MessageStatus, Packet};
use crate::transport::BulkTransport;

impl<T: BulkTransport> CanalystII<T> {
    /// Query pending RX/TX frame counts of a channel
    pub fn message_status(&mut self, channel: Channel) -> Result<MessageStatus> {
        let request = MessageStatus::request();
        let mut response = MessageStatus::request();
        self.transact(channel.command_endpoint(), Some(&request), Some(&mut response))?;
        Ok(response.message_status())
    }

    /// Wait until the adapter has transmitted every queued frame
    ///
    /// Polls the message status until `tx_pending` reaches zero. A zero
    /// `timeout` polls without limit; otherwise `FlushFailed` is returned once
    /// the deadline passes with frames still pending. A failed query ends the
    /// flush with that query's error.
    pub fn flush_tx_buffer(&mut self, channel: Channel, timeout: Duration) -> Result<()> {
        let deadline = (!timeout.is_zero())
            .then(|| Instant::now().checked_add(timeout))
            .flatten();
        let mut polls = 0u32;

        loop {
            let status = self.message_status(channel)?;
            polls += 1;

            if status.tx_pending == 0 {
                debug!("{}: TX buffer flushed after {} polls", channel, polls);
                return Ok(());
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(
                        "{}: TX flush timed out with {} frames pending",
                        channel, status.tx_pending
                    );
                    return Err(CanalystError::FlushFailed {
                        pending: status.tx_pending,
                    });
                }
            }

            trace!("{}: {} frames pending", channel, status.tx_pending);
        }
    }

    /// Discard every frame waiting in the adapter's RX buffer
    pub fn clear_rx_buffer(&mut self, channel: Channel) -> Result<()> {
        let request = Packet::command(COMMAND_CLEAR_RX_BUFFER);
        self.transact(channel.command_endpoint(), Some(&request), None)
            .map_err(|e| CanalystError::ClearFailed(Box::new(e)))?;
        debug!("{}: RX buffer cleared", channel);
        Ok(())
    }

    /// Fail with `BufferOverflow` if the TX buffer is past capacity
    pub(crate) fn admit_write(&mut self, channel: Channel) -> Result<()> {
        let status = self.message_status(channel)?;
        if status.tx_pending > WRITE_BUFFER_CAPACITY {
            warn!(
                "{}: write rejected, {} frames pending",
                channel, status.tx_pending
            );
            return Err(CanalystError::BufferOverflow {
                pending: status.tx_pending,
            });
        }
        Ok(())
    }

    /// Fail with `BufferEmpty` if there is nothing to read
    pub(crate) fn check_read(&mut self, channel: Channel) -> Result<()> {
        let status = self.message_status(channel)?;
        if status.rx_pending == 0 {
            trace!("{}: read rejected, RX buffer empty", channel);
            return Err(CanalystError::BufferEmpty);
        }
        Ok(())
    }
}

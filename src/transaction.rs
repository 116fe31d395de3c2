//! Packet transactions
//!
//! A transaction is at most two independent bulk transfers of one full packet
//! each: an optional write to the OUT side of an endpoint followed by an
//! optional read from its IN side. Nothing is retried here.

use log::trace;

use crate::constants::{ENDPOINT_IN, ENDPOINT_OUT, PACKET_SIZE};
use crate::device::CanalystII;
use crate::error::{CanalystError, Result};
use crate::packet::Packet;
use crate::transport::BulkTransport;

impl<T: BulkTransport> CanalystII<T> {
    /// Run one transaction against endpoint number `endpoint`
    ///
    /// Writes `request` (if any), then reads into `response` (if any), both
    /// with the session timeout. The read happens whether or not the device
    /// has anything to say; ordering the exchange is up to the caller.
    ///
    /// Returns `NullArgument` without touching the transport when both are
    /// `None`, and a transfer error for any failed or short transfer.
    pub fn transact(
        &mut self,
        endpoint: u8,
        request: Option<&Packet>,
        response: Option<&mut Packet>,
    ) -> Result<()> {
        if request.is_none() && response.is_none() {
            return Err(CanalystError::NullArgument);
        }

        if let Some(request) = request {
            let address = endpoint | ENDPOINT_OUT;
            trace!("=> 0x{:02x} {}", address, hex::encode(request.as_bytes()));
            let sent = self
                .transport
                .write_bulk(address, request.as_bytes(), self.timeout)
                .map_err(|source| CanalystError::BulkTransfer {
                    endpoint: address,
                    source,
                })?;
            check_full_packet(address, sent)?;
        }

        if let Some(response) = response {
            let address = endpoint | ENDPOINT_IN;
            let received = self
                .transport
                .read_bulk(address, response.as_bytes_mut(), self.timeout)
                .map_err(|source| CanalystError::BulkTransfer {
                    endpoint: address,
                    source,
                })?;
            check_full_packet(address, received)?;
            trace!("<= 0x{:02x} {}", address, hex::encode(response.as_bytes()));
        }

        Ok(())
    }
}

fn check_full_packet(endpoint: u8, actual: usize) -> Result<()> {
    if actual != PACKET_SIZE {
        return Err(CanalystError::ShortTransfer {
            endpoint,
            expected: PACKET_SIZE,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::constants::COMMAND_START;
    use crate::error::ErrorKind;
    use crate::transport::mock::{MockTransport, Reply, Transfer};

    #[test]
    fn test_neither_direction_is_null_argument() {
        let mut dev = CanalystII::new(MockTransport::new());
        let err = dev.transact(0x02, None, None).unwrap_err();
        assert!(matches!(err, CanalystError::NullArgument));
        assert!(dev.transport().transfers.is_empty());
    }

    #[test]
    fn test_write_then_read_with_direction_bits() {
        let mut mock = MockTransport::new();
        mock.queue_status(4, 5);
        let mut dev = CanalystII::new(mock);

        let request = Packet::command(COMMAND_START);
        let mut response = Packet::zeroed();
        dev.transact(0x04, Some(&request), Some(&mut response))
            .unwrap();

        assert_eq!(
            dev.transport().transfers,
            vec![
                Transfer::Write {
                    endpoint: 0x04,
                    data: request.as_bytes().to_vec(),
                },
                Transfer::Read { endpoint: 0x84 },
            ]
        );
        assert_eq!(response.message_status().rx_pending, 4);
        assert_eq!(response.message_status().tx_pending, 5);
    }

    #[test]
    fn test_short_write_fails() {
        let mut mock = MockTransport::new();
        mock.queue_write(Reply::Short(32));
        let mut dev = CanalystII::new(mock);

        let request = Packet::command(COMMAND_START);
        let mut response = Packet::zeroed();
        let err = dev
            .transact(0x02, Some(&request), Some(&mut response))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert!(matches!(
            err,
            CanalystError::ShortTransfer {
                endpoint: 0x02,
                expected: 64,
                actual: 32
            }
        ));
        // read phase never ran
        assert_eq!(dev.transport().reads_from(0x82), 0);
    }

    #[test]
    fn test_short_read_fails() {
        let mut mock = MockTransport::new();
        mock.queue_read_reply(Reply::Short(63));
        let mut dev = CanalystII::new(mock);

        let mut response = Packet::zeroed();
        let err = dev.transact(0x01, None, Some(&mut response)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert!(matches!(
            err,
            CanalystError::ShortTransfer {
                endpoint: 0x81,
                actual: 63,
                ..
            }
        ));
    }

    #[test]
    fn test_transport_error_surfaces_immediately() {
        let mut mock = MockTransport::new();
        mock.queue_write(Reply::Fail(rusb::Error::Pipe));
        let mut dev = CanalystII::new(mock);

        let request = Packet::command(COMMAND_START);
        let err = dev.transact(0x02, Some(&request), None).unwrap_err();
        assert!(matches!(
            err,
            CanalystError::BulkTransfer {
                endpoint: 0x02,
                source: rusb::Error::Pipe
            }
        ));
        assert_eq!(dev.transport().transfers.len(), 1);
    }

    #[test]
    fn test_every_transfer_uses_session_timeout() {
        let mut mock = MockTransport::new();
        mock.queue_status(0, 0);
        let mut dev = CanalystII::new(mock).with_timeout(Duration::from_millis(250));

        let request = Packet::command(COMMAND_START);
        dev.transact(0x02, Some(&request), None).unwrap();
        dev.set_timeout(Duration::ZERO);
        let mut response = Packet::zeroed();
        dev.transact(0x02, None, Some(&mut response)).unwrap();

        assert_eq!(
            dev.transport().timeouts,
            vec![Duration::from_millis(250), Duration::ZERO]
        );
    }
}

//! Bulk transfer transport
//!
//! The protocol layer only needs blocking bulk transfers on an interface that
//! is already open and claimed. `BulkTransport` is that seam: `rusb` device
//! handles implement it directly, tests use a scripted mock.

use std::time::Duration;

use rusb::{DeviceHandle, UsbContext};

/// Blocking bulk transfers on a claimed USB interface
///
/// `endpoint` is the full endpoint address, direction bit included. A zero
/// `timeout` waits without limit.
pub trait BulkTransport {
    /// Write `buf` to an OUT endpoint, returning the number of bytes sent
    fn write_bulk(&mut self, endpoint: u8, buf: &[u8], timeout: Duration) -> rusb::Result<usize>;

    /// Read into `buf` from an IN endpoint, returning the number of bytes received
    fn read_bulk(&mut self, endpoint: u8, buf: &mut [u8], timeout: Duration)
        -> rusb::Result<usize>;
}

impl<T: UsbContext> BulkTransport for DeviceHandle<T> {
    fn write_bulk(&mut self, endpoint: u8, buf: &[u8], timeout: Duration) -> rusb::Result<usize> {
        DeviceHandle::write_bulk(self, endpoint, buf, timeout)
    }

    fn read_bulk(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::read_bulk(self, endpoint, buf, timeout)
    }
}

impl<B: BulkTransport + ?Sized> BulkTransport for &mut B {
    fn write_bulk(&mut self, endpoint: u8, buf: &[u8], timeout: Duration) -> rusb::Result<usize> {
        (**self).write_bulk(endpoint, buf, timeout)
    }

    fn read_bulk(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        (**self).read_bulk(endpoint, buf, timeout)
    }
}

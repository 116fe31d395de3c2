//! USB device session
//!
//! Opens the adapter with `rusb` and holds its interface claimed for as long
//! as the `UsbDevice` lives. Each acquisition step owns what it acquired, so
//! a failure part-way through releases the earlier steps in reverse order.

use std::time::Duration;

use log::{debug, warn};
use rusb::{Context, DeviceHandle, UsbContext};

use crate::constants::{USB_CONFIGURATION, USB_ID_PRODUCT, USB_ID_VENDOR, USB_INTERFACE};
use crate::error::{CanalystError, Result};
use crate::transport::BulkTransport;

/// An opened Canalyst-II with its bulk interface claimed
pub struct UsbDevice {
    handle: DeviceHandle<Context>,
    claimed: bool,
}

impl UsbDevice {
    /// Open the first Canalyst-II on the bus
    pub fn open() -> Result<Self> {
        Self::open_with_ids(USB_ID_VENDOR, USB_ID_PRODUCT)
    }

    /// Open the first device with the given vendor/product ID
    pub fn open_with_ids(vendor_id: u16, product_id: u16) -> Result<Self> {
        let context = Context::new().map_err(CanalystError::TransportInit)?;

        let mut handle = context
            .open_device_with_vid_pid(vendor_id, product_id)
            .ok_or(CanalystError::DeviceNotFound)?;

        let config = handle
            .active_configuration()
            .map_err(CanalystError::GetConfiguration)?;
        if config != USB_CONFIGURATION {
            handle
                .set_active_configuration(USB_CONFIGURATION)
                .map_err(CanalystError::SetConfiguration)?;
        }

        // Detach kernel driver on Linux/Unix
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            if handle.kernel_driver_active(USB_INTERFACE).unwrap_or(false) {
                handle
                    .detach_kernel_driver(USB_INTERFACE)
                    .map_err(CanalystError::DetachKernelDriver)?;
            }
        }

        handle
            .claim_interface(USB_INTERFACE)
            .map_err(CanalystError::ClaimInterface)?;

        debug!(
            "opened Canalyst-II {:04x}:{:04x} (bus {}, addr {})",
            vendor_id,
            product_id,
            handle.device().bus_number(),
            handle.device().address()
        );

        Ok(Self {
            handle,
            claimed: true,
        })
    }

    /// Release the interface and close the device
    pub fn close(mut self) -> Result<()> {
        self.claimed = false;
        self.handle
            .release_interface(USB_INTERFACE)
            .map_err(CanalystError::ReleaseInterface)
    }

    /// Get the USB bus number
    pub fn bus(&self) -> u8 {
        self.handle.device().bus_number()
    }

    /// Get the USB device address
    pub fn address(&self) -> u8 {
        self.handle.device().address()
    }
}

impl BulkTransport for UsbDevice {
    fn write_bulk(&mut self, endpoint: u8, buf: &[u8], timeout: Duration) -> rusb::Result<usize> {
        self.handle.write_bulk(endpoint, buf, timeout)
    }

    fn read_bulk(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        self.handle.read_bulk(endpoint, buf, timeout)
    }
}

impl std::fmt::Display for UsbDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Canalyst-II {:04x}:{:04x} (bus {}, addr {})",
            USB_ID_VENDOR,
            USB_ID_PRODUCT,
            self.bus(),
            self.address()
        )
    }
}

impl std::fmt::Debug for UsbDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbDevice")
            .field("bus", &self.bus())
            .field("address", &self.address())
            .field("claimed", &self.claimed)
            .finish()
    }
}

impl Drop for UsbDevice {
    fn drop(&mut self) {
        if self.claimed {
            if let Err(e) = self.handle.release_interface(USB_INTERFACE) {
                warn!("failed to release USB interface on drop: {}", e);
            }
        }
    }
}

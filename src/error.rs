//! Error types for the Canalyst-II library
//!
//! This module defines the error type returned by every operation, the
//! numeric error kinds of the adapter's C API, and the lookup from those
//! codes to human-readable descriptions.

use thiserror::Error;

/// Result type alias for Canalyst-II operations
pub type Result<T> = std::result::Result<T, CanalystError>;

/// Error types for Canalyst-II operations
#[derive(Error, Debug)]
pub enum CanalystError {
    /// USB context could not be created
    #[error("USB initialization failed: {0}")]
    TransportInit(rusb::Error),

    /// No adapter with the expected vendor/product ID
    #[error("No Canalyst-II device found")]
    DeviceNotFound,

    /// Reading the active USB configuration failed
    #[error("Failed to get USB configuration: {0}")]
    GetConfiguration(rusb::Error),

    /// Selecting the USB configuration failed
    #[error("Failed to set USB configuration: {0}")]
    SetConfiguration(rusb::Error),

    /// Failed to detach kernel driver
    #[error("Failed to detach kernel driver: {0}")]
    DetachKernelDriver(rusb::Error),

    /// Failed to claim interface
    #[error("Failed to claim USB interface: {0}")]
    ClaimInterface(rusb::Error),

    /// Failed to release interface
    #[error("Failed to release USB interface: {0}")]
    ReleaseInterface(rusb::Error),

    /// A transaction was requested with neither a request nor a response
    #[error("Transaction has neither request nor response packet")]
    NullArgument,

    /// Bulk transfer failed in the transport
    #[error("Bulk transfer on endpoint 0x{endpoint:02x} failed: {source}")]
    BulkTransfer { endpoint: u8, source: rusb::Error },

    /// Bulk transfer moved fewer bytes than a full packet
    #[error("Short bulk transfer on endpoint 0x{endpoint:02x}: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        endpoint: u8,
        expected: usize,
        actual: usize,
    },

    /// TX messages were still pending when the flush deadline passed
    #[error("TX buffer flush timed out with {pending} messages pending")]
    FlushFailed { pending: u32 },

    /// Clear-RX-buffer command could not be delivered
    #[error("Failed to clear RX buffer: {0}")]
    ClearFailed(#[source] Box<CanalystError>),

    /// Adapter TX buffer is too full to accept another packet
    #[error("TX buffer overflow: {pending} messages pending")]
    BufferOverflow { pending: u32 },

    /// Adapter has no received frames to hand out
    #[error("RX buffer is empty")]
    BufferEmpty,

    /// Frame data longer than a classic CAN frame allows
    #[error("CAN frame data too long: {len} bytes (max 8)")]
    DataTooLong { len: usize },

    /// Frame buffer already holds the maximum number of frames
    #[error("Frame buffer is full (max 3 frames per packet)")]
    TooManyFrames,
}

impl CanalystError {
    /// Get the error kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CanalystError::TransportInit(_) => ErrorKind::TransportInit,
            CanalystError::DeviceNotFound => ErrorKind::DeviceNotFound,
            CanalystError::GetConfiguration(_) => ErrorKind::GetConfiguration,
            CanalystError::SetConfiguration(_) => ErrorKind::SetConfiguration,
            CanalystError::DetachKernelDriver(_) => ErrorKind::KernelDriverDetach,
            CanalystError::ClaimInterface(_) => ErrorKind::InterfaceClaim,
            CanalystError::ReleaseInterface(_) => ErrorKind::InterfaceRelease,
            CanalystError::NullArgument => ErrorKind::NullArgument,
            CanalystError::BulkTransfer { .. } | CanalystError::ShortTransfer { .. } => {
                ErrorKind::TransferFailed
            }
            CanalystError::FlushFailed { .. } => ErrorKind::FlushFailed,
            CanalystError::ClearFailed(_) => ErrorKind::ClearFailed,
            CanalystError::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            CanalystError::BufferEmpty => ErrorKind::BufferEmpty,
            CanalystError::DataTooLong { .. } | CanalystError::TooManyFrames => {
                ErrorKind::InvalidFrame
            }
        }
    }

    /// Check if this error is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            CanalystError::FlushFailed { .. }
                | CanalystError::BulkTransfer {
                    source: rusb::Error::Timeout,
                    ..
                }
        )
    }

    /// Check if this error is a USB error
    pub fn is_usb_error(&self) -> bool {
        matches!(
            self,
            CanalystError::TransportInit(_)
                | CanalystError::GetConfiguration(_)
                | CanalystError::SetConfiguration(_)
                | CanalystError::DetachKernelDriver(_)
                | CanalystError::ClaimInterface(_)
                | CanalystError::ReleaseInterface(_)
                | CanalystError::BulkTransfer { .. }
        )
    }
}

/// Error kinds with their numeric C API codes
///
/// Codes are negative in the C API; [`describe`] accepts either sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    NoError = 0,
    TransportInit = -1,
    DeviceNotFound = -2,
    GetConfiguration = -3,
    SetConfiguration = -4,
    KernelDriverDetach = -5,
    InterfaceClaim = -6,
    InterfaceRelease = -7,
    NullArgument = -8,
    TransferFailed = -9,
    FlushFailed = -10,
    ClearFailed = -11,
    BufferOverflow = -12,
    BufferEmpty = -13,
    InvalidFrame = -14,
}

impl ErrorKind {
    /// Every declared kind, in code order
    pub const ALL: [ErrorKind; 15] = [
        ErrorKind::NoError,
        ErrorKind::TransportInit,
        ErrorKind::DeviceNotFound,
        ErrorKind::GetConfiguration,
        ErrorKind::SetConfiguration,
        ErrorKind::KernelDriverDetach,
        ErrorKind::InterfaceClaim,
        ErrorKind::InterfaceRelease,
        ErrorKind::NullArgument,
        ErrorKind::TransferFailed,
        ErrorKind::FlushFailed,
        ErrorKind::ClearFailed,
        ErrorKind::BufferOverflow,
        ErrorKind::BufferEmpty,
        ErrorKind::InvalidFrame,
    ];

    /// Numeric code of this kind
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a kind by numeric code (sign is ignored)
    pub fn from_code(code: i32) -> Option<ErrorKind> {
        let magnitude = code.unsigned_abs() as usize;
        Self::ALL.get(magnitude).copied()
    }

    /// Human-readable description of this kind
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::NoError => "No error has occurred",
            ErrorKind::TransportInit => "Error occurred during USB initialization",
            ErrorKind::DeviceNotFound => "Error occurred while trying to open the USB device",
            ErrorKind::GetConfiguration => {
                "Error occurred while trying to get the USB device configuration"
            }
            ErrorKind::SetConfiguration => {
                "Error occurred while trying to set the USB device configuration"
            }
            ErrorKind::KernelDriverDetach => {
                "Error occurred while trying to detach the USB device driver"
            }
            ErrorKind::InterfaceClaim => "Error occurred while trying to claim the USB device",
            ErrorKind::InterfaceRelease => "Error occurred while trying to release the USB device",
            ErrorKind::NullArgument => "Null pointer was encountered, which is not allowed",
            ErrorKind::TransferFailed => "Error occurred while performing a bulk USB transfer",
            ErrorKind::FlushFailed => "Error occurred while trying to flush TX data buffer",
            ErrorKind::ClearFailed => "Error occurred while trying to clear RX data buffer",
            ErrorKind::BufferOverflow => "TX buffer has overflowed",
            ErrorKind::BufferEmpty => "RX buffer is empty",
            ErrorKind::InvalidFrame => "CAN frame does not fit the packet layout",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Describe a numeric error code
///
/// Returns `None` for codes that name no known kind.
pub fn describe(code: i32) -> Option<&'static str> {
    ErrorKind::from_code(code).map(ErrorKind::description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_description() {
        for kind in ErrorKind::ALL {
            assert!(!kind.description().is_empty());
            assert_eq!(describe(kind.code()), Some(kind.description()));
        }
    }

    #[test]
    fn test_describe_ignores_sign() {
        assert_eq!(describe(-13), Some("RX buffer is empty"));
        assert_eq!(describe(13), Some("RX buffer is empty"));
        assert_eq!(describe(0), Some("No error has occurred"));
    }

    #[test]
    fn test_describe_unknown_code() {
        assert_eq!(describe(-15), None);
        assert_eq!(describe(1000), None);
        assert_eq!(describe(i32::MIN), None);
        assert_eq!(ErrorKind::from_code(i32::MAX), None);
    }

    #[test]
    fn test_kind_codes_are_ordered() {
        for (index, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.code(), -(index as i32));
            assert_eq!(ErrorKind::from_code(kind.code()), Some(*kind));
        }
    }

    #[test]
    fn test_error_kind_mapping() {
        let short = CanalystError::ShortTransfer {
            endpoint: 0x81,
            expected: 64,
            actual: 12,
        };
        assert_eq!(short.kind(), ErrorKind::TransferFailed);
        assert!(!short.is_usb_error());

        let bulk = CanalystError::BulkTransfer {
            endpoint: 0x02,
            source: rusb::Error::Timeout,
        };
        assert_eq!(bulk.kind(), ErrorKind::TransferFailed);
        assert!(bulk.is_timeout());
        assert!(bulk.is_usb_error());

        let clear = CanalystError::ClearFailed(Box::new(bulk));
        assert_eq!(clear.kind(), ErrorKind::ClearFailed);
        assert_eq!(CanalystError::BufferEmpty.kind().code(), -13);
        assert_eq!(CanalystError::TooManyFrames.kind(), ErrorKind::InvalidFrame);
    }
}

//! Channel to endpoint routing
//!
//! The adapter exposes two independent CAN channels, each with its own
//! command endpoint and data endpoint. Endpoint numbers returned here carry
//! no direction bit; the transaction layer ORs in `ENDPOINT_IN`/`ENDPOINT_OUT`.

use crate::constants::{CHANNEL_COMMAND_ENDPOINTS, CHANNEL_COUNT, CHANNEL_DATA_ENDPOINTS};

/// CAN channel of the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    #[default]
    Zero,
    One,
}

impl Channel {
    /// Both channels, in index order
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Zero, Channel::One];

    /// Channel index (0 or 1)
    pub fn index(self) -> usize {
        match self {
            Channel::Zero => 0,
            Channel::One => 1,
        }
    }

    /// Endpoint number used for commands and status queries
    pub fn command_endpoint(self) -> u8 {
        CHANNEL_COMMAND_ENDPOINTS[self.index()]
    }

    /// Endpoint number used for frame-buffer packets
    pub fn data_endpoint(self) -> u8 {
        CHANNEL_DATA_ENDPOINTS[self.index()]
    }
}

/// Out-of-range values wrap: `|value| % 2`.
///
/// Channel values are never rejected, only folded onto the two real
/// channels, so e.g. `-1` selects channel 1 and `2` selects channel 0.
impl From<i32> for Channel {
    fn from(value: i32) -> Self {
        match value.unsigned_abs() as usize % CHANNEL_COUNT {
            0 => Channel::Zero,
            _ => Channel::One,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CAN{}", self.index())
    }
}

/// Command endpoint number for a raw channel value (wraps out-of-range values)
pub fn command_endpoint(channel: i32) -> u8 {
    Channel::from(channel).command_endpoint()
}

/// Data endpoint number for a raw channel value (wraps out-of-range values)
pub fn data_endpoint(channel: i32) -> u8 {
    Channel::from(channel).data_endpoint()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_table() {
        assert_eq!(command_endpoint(0), 0x02);
        assert_eq!(command_endpoint(1), 0x04);
        assert_eq!(data_endpoint(0), 0x01);
        assert_eq!(data_endpoint(1), 0x03);
    }

    #[test]
    fn test_out_of_range_channel_wraps() {
        // |value| % 2, never rejected
        assert_eq!(Channel::from(2), Channel::Zero);
        assert_eq!(Channel::from(3), Channel::One);
        assert_eq!(Channel::from(-1), Channel::One);
        assert_eq!(Channel::from(-2), Channel::Zero);
        assert_eq!(Channel::from(i32::MIN), Channel::Zero);
        assert_eq!(Channel::from(i32::MAX), Channel::One);

        assert_eq!(command_endpoint(-1), 0x04);
        assert_eq!(data_endpoint(7), 0x03);
        assert_eq!(data_endpoint(-4), 0x01);
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Zero.to_string(), "CAN0");
        assert_eq!(Channel::One.to_string(), "CAN1");
    }
}

//! CAN bit rate timing table
//!
//! The adapter's CAN controller is configured through a pair of timing
//! register words (BTR0/BTR1 equivalents) sent in the init command.

/// Supported CAN bit rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bitrate {
    Kbps5,
    Kbps10,
    Kbps20,
    Kbps33_33,
    Kbps40,
    Kbps50,
    Kbps66_66,
    Kbps80,
    Kbps83_33,
    Kbps100,
    Kbps125,
    Kbps200,
    Kbps250,
    Kbps400,
    Kbps500,
    Kbps666,
    Kbps800,
    Mbps1,
}

impl Bitrate {
    /// Every supported bit rate, slowest first
    pub const ALL: [Bitrate; 18] = [
        Bitrate::Kbps5,
        Bitrate::Kbps10,
        Bitrate::Kbps20,
        Bitrate::Kbps33_33,
        Bitrate::Kbps40,
        Bitrate::Kbps50,
        Bitrate::Kbps66_66,
        Bitrate::Kbps80,
        Bitrate::Kbps83_33,
        Bitrate::Kbps100,
        Bitrate::Kbps125,
        Bitrate::Kbps200,
        Bitrate::Kbps250,
        Bitrate::Kbps400,
        Bitrate::Kbps500,
        Bitrate::Kbps666,
        Bitrate::Kbps800,
        Bitrate::Mbps1,
    ];

    /// Timing register pair for this bit rate
    pub fn timing(self) -> [u32; 2] {
        match self {
            Bitrate::Kbps5 => [0xBF, 0xFF],
            Bitrate::Kbps10 => [0x31, 0x1C],
            Bitrate::Kbps20 => [0x18, 0x1C],
            Bitrate::Kbps33_33 => [0x09, 0x6F],
            Bitrate::Kbps40 => [0x87, 0xFF],
            Bitrate::Kbps50 => [0x09, 0x1C],
            Bitrate::Kbps66_66 => [0x04, 0x6F],
            Bitrate::Kbps80 => [0x83, 0xFF],
            Bitrate::Kbps83_33 => [0x03, 0x6F],
            Bitrate::Kbps100 => [0x04, 0x1C],
            Bitrate::Kbps125 => [0x03, 0x1C],
            Bitrate::Kbps200 => [0x81, 0xFA],
            Bitrate::Kbps250 => [0x01, 0x1C],
            Bitrate::Kbps400 => [0x80, 0xFA],
            Bitrate::Kbps500 => [0x00, 0x1C],
            Bitrate::Kbps666 => [0x80, 0xB6],
            Bitrate::Kbps800 => [0x00, 0x16],
            Bitrate::Mbps1 => [0x00, 0x14],
        }
    }

    /// Nominal bit rate in bits per second
    pub fn bits_per_second(self) -> u32 {
        match self {
            Bitrate::Kbps5 => 5_000,
            Bitrate::Kbps10 => 10_000,
            Bitrate::Kbps20 => 20_000,
            Bitrate::Kbps33_33 => 33_330,
            Bitrate::Kbps40 => 40_000,
            Bitrate::Kbps50 => 50_000,
            Bitrate::Kbps66_66 => 66_660,
            Bitrate::Kbps80 => 80_000,
            Bitrate::Kbps83_33 => 83_330,
            Bitrate::Kbps100 => 100_000,
            Bitrate::Kbps125 => 125_000,
            Bitrate::Kbps200 => 200_000,
            Bitrate::Kbps250 => 250_000,
            Bitrate::Kbps400 => 400_000,
            Bitrate::Kbps500 => 500_000,
            Bitrate::Kbps666 => 666_000,
            Bitrate::Kbps800 => 800_000,
            Bitrate::Mbps1 => 1_000_000,
        }
    }

    /// Look up a bit rate by its value in bits per second
    pub fn from_bits_per_second(bitrate: u32) -> Option<Bitrate> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.bits_per_second() == bitrate)
    }
}

impl std::fmt::Display for Bitrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bps = self.bits_per_second();
        if bps >= 1_000_000 {
            write!(f, "{} Mbps", bps / 1_000_000)
        } else if bps % 1_000 == 0 {
            write!(f, "{} kbps", bps / 1_000)
        } else {
            write!(f, "{:.2} kbps", bps as f32 / 1_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_values() {
        assert_eq!(Bitrate::Kbps125.timing(), [0x03, 0x1C]);
        assert_eq!(Bitrate::Kbps500.timing(), [0x00, 0x1C]);
        assert_eq!(Bitrate::Mbps1.timing(), [0x00, 0x14]);
        assert_eq!(Bitrate::Kbps5.timing(), [0xBF, 0xFF]);
    }

    #[test]
    fn test_from_bits_per_second() {
        assert_eq!(Bitrate::from_bits_per_second(250_000), Some(Bitrate::Kbps250));
        assert_eq!(Bitrate::from_bits_per_second(33_330), Some(Bitrate::Kbps33_33));
        assert_eq!(Bitrate::from_bits_per_second(300_000), None);
    }

    #[test]
    fn test_table_is_sorted_and_unique() {
        for pair in Bitrate::ALL.windows(2) {
            assert!(pair[0].bits_per_second() < pair[1].bits_per_second());
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Bitrate::Kbps125.to_string(), "125 kbps");
        assert_eq!(Bitrate::Mbps1.to_string(), "1 Mbps");
        assert_eq!(Bitrate::Kbps83_33.to_string(), "83.33 kbps");
    }
}

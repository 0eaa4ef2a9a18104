//! Persisted device record
//!
//! The last committed actuator position and indicator state, stored as
//! postcard binary data behind a magic number, version and CRC so a torn or
//! foreign record is detected instead of trusted.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::um_to_mm;
use crate::Error;

/// Magic number to identify a device record ("RCKN")
pub const RECORD_MAGIC: u32 = 0x52434B4E;

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

/// Indicator on/off state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IndicatorState {
    /// Indicator lit
    On,
    /// Indicator dark
    #[default]
    Off,
}

impl IndicatorState {
    /// The opposite state
    pub fn toggled(self) -> Self {
        match self {
            IndicatorState::On => IndicatorState::Off,
            IndicatorState::Off => IndicatorState::On,
        }
    }

    /// Check if the indicator is lit
    pub fn is_on(self) -> bool {
        self == IndicatorState::On
    }

    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorState::On => "on",
            IndicatorState::Off => "off",
        }
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(IndicatorState::On),
            "off" => Ok(IndicatorState::Off),
            _ => Err(Error::InvalidParameter("indicator state must be on or off")),
        }
    }
}

/// Complete record stored for one device
///
/// Overwritten wholesale on every update; there is no merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Last committed actuator position in um
    pub position_um: u32,
    /// Last committed indicator state
    pub indicator: IndicatorState,
    /// CRC32 checksum (calculated over magic..indicator)
    pub crc: u32,
}

impl Default for DeviceRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRecord {
    /// Create the default record: retracted, indicator off
    pub const fn new() -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            position_um: 0,
            indicator: IndicatorState::Off,
            crc: 0,
        }
    }

    /// Check if the header is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == RECORD_MAGIC && self.version == RECORD_VERSION
    }

    /// Position in millimetres
    pub fn position_mm(&self) -> f32 {
        um_to_mm(self.position_um)
    }

    /// Calculate CRC32 for the record (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.position_um.to_le_bytes());
        crc = crc32_update(crc, &[self.indicator.is_on() as u8]);

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "actuator position: {:.3} mm, indicator: {}",
            self.position_mm(),
            self.indicator
        )
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record() {
        let record = DeviceRecord::default();
        assert!(record.is_valid());
        assert_eq!(record.position_um, 0);
        assert_eq!(record.indicator, IndicatorState::Off);
    }

    #[test]
    fn test_crc_consistency() {
        let mut record = DeviceRecord::new();
        record.position_um = 100_000;
        record.update_crc();
        assert!(record.verify_crc());

        // Modify data without updating CRC
        record.indicator = IndicatorState::On;
        assert!(!record.verify_crc());
    }

    #[test]
    fn test_crc_matches_reference() {
        // Standard CRC32 check value
        assert_eq!(!crc32_update(0xFFFFFFFF, b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_foreign_header_invalid() {
        let record = DeviceRecord {
            magic: 0x50494443,
            ..DeviceRecord::new()
        };
        assert!(!record.is_valid());
    }

    #[test]
    fn test_indicator_parse_and_toggle() {
        assert_eq!("on".parse::<IndicatorState>(), Ok(IndicatorState::On));
        assert_eq!("off".parse::<IndicatorState>(), Ok(IndicatorState::Off));
        assert!("dim".parse::<IndicatorState>().is_err());
        assert_eq!(IndicatorState::On.toggled(), IndicatorState::Off);
    }

    #[test]
    fn test_display() {
        let record = DeviceRecord {
            position_um: 100_500,
            indicator: IndicatorState::On,
            ..DeviceRecord::new()
        };
        assert_eq!(
            std::format!("{record}"),
            "actuator position: 100.500 mm, indicator: on"
        );
    }
}

//! Die temperature readout.
//!
//! The sensor result is a 10-bit two's complement value left-justified across
//! the MSB (integer degrees) and the top two bits of the LSB (quarter degrees).

use crate::registers::{Temperature as TemperatureRegister, TemperatureFraction};

/// Degrees Celsius per raw unit.
pub const TEMPERATURE_RESOLUTION: f32 = 0.25;

/// A temperature reading.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    /// Signed count of quarter degrees
    pub raw: i16,
    /// Degrees Celsius
    pub celsius: f32,
}

impl Temperature {
    /// Decodes the temperature registers (0x11, 0x12).
    #[must_use]
    pub fn from_registers(msb: TemperatureRegister, lsb: TemperatureFraction) -> Self {
        let raw = i16::from(msb.temperature()) * 4 + i16::from(lsb.temperature_fraction());
        Self {
            raw,
            celsius: f32::from(raw) * TEMPERATURE_RESOLUTION,
        }
    }
}

impl From<[u8; 2]> for Temperature {
    fn from(data: [u8; 2]) -> Self {
        Self::from_registers(TemperatureRegister(data[0]), TemperatureFraction(data[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive() {
        let t = Temperature::from([0x19, 0x40]);
        assert_eq!(t.raw, 101);
        assert_eq!(t.celsius, 25.25);

        let t = Temperature::from([0x00, 0x00]);
        assert_eq!(t.raw, 0);
        assert_eq!(t.celsius, 0.0);
    }

    #[test]
    fn test_negative() {
        let t = Temperature::from([0xE7, 0x00]);
        assert_eq!(t.raw, -100);
        assert_eq!(t.celsius, -25.0);

        let t = Temperature::from([0xFF, 0xC0]);
        assert_eq!(t.raw, -1);
        assert_eq!(t.celsius, -0.25);

        let t = Temperature::from([0xD8, 0x40]);
        assert_eq!(t.raw, -159);
        assert_eq!(t.celsius, -39.75);
    }

    #[test]
    fn test_matches_shifted_sign_extension() {
        // the 16-bit value shifted right by 6 gives the same count
        for msb in 0..=0xFFu8 {
            for quarter in 0..4u8 {
                let lsb = quarter << 6;
                let expected = i16::from_be_bytes([msb, lsb]) >> 6;
                assert_eq!(Temperature::from([msb, lsb]).raw, expected);
            }
        }
    }

    #[test]
    fn test_unused_low_bits_ignored() {
        assert_eq!(Temperature::from([0x19, 0x7F]).raw, 101);
    }
}

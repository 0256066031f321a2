//! Binary-coded decimal helpers.
//!
//! Every calendar and alarm register of the DS3231 holds its value as packed
//! BCD: the tens digit in the high nibble and the ones digit in the low
//! nibble. Callers validate values before encoding, so both directions are
//! total and only meaningful for `0..=99`.

/// Packs a decimal value (0-99) into BCD.
#[must_use]
pub const fn hex2bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Unpacks a BCD byte into its decimal value.
#[must_use]
pub const fn bcd2hex(raw: u8) -> u8 {
    (raw >> 4) * 10 + (raw & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex2bcd() {
        assert_eq!(hex2bcd(0), 0x00);
        assert_eq!(hex2bcd(9), 0x09);
        assert_eq!(hex2bcd(10), 0x10);
        assert_eq!(hex2bcd(45), 0x45);
        assert_eq!(hex2bcd(59), 0x59);
        assert_eq!(hex2bcd(99), 0x99);
    }

    #[test]
    fn test_bcd2hex() {
        assert_eq!(bcd2hex(0x00), 0);
        assert_eq!(bcd2hex(0x09), 9);
        assert_eq!(bcd2hex(0x10), 10);
        assert_eq!(bcd2hex(0x31), 31);
        assert_eq!(bcd2hex(0x99), 99);
    }

    #[test]
    fn test_every_decimal_survives_packing() {
        for value in 0..=99 {
            assert_eq!(bcd2hex(hex2bcd(value)), value);
        }
    }
}

//! # Bit Field Extraction
//!
//! Pure helpers for pulling sub-fields out of instruction bytes and for the
//! two reinterpretations the 8086 wire format needs: little-endian 16-bit
//! combination and two's-complement sign extension.
//!
//! All functions here are total and stateless. Sign extension is done with
//! explicit width casts, never pointer reinterpretation.

/// Mask for the lowest bit of a byte.
pub const LOW_1BIT: u8 = 0b0000_0001;

/// Mask for the lowest two bits of a byte.
pub const LOW_2BIT: u8 = 0b0000_0011;

/// Mask for the lowest three bits of a byte.
pub const LOW_3BIT: u8 = 0b0000_0111;

/// Mask for the lowest four bits of a byte.
pub const LOW_4BIT: u8 = 0b0000_1111;

/// Combines two bytes into a 16-bit value, `high` in the upper half.
///
/// The 8086 transmits multi-byte fields low byte first, so callers pass the
/// *second* byte read as `high` and the *first* as `low`.
///
/// # Examples
///
/// ```
/// use disasm8086::bits::combine;
///
/// assert_eq!(combine(0x01, 0x02), 0x0102);
/// ```
pub fn combine(high: u8, low: u8) -> u16 {
    (u16::from(high) << 8) | u16::from(low)
}

/// Reinterprets a raw byte as a signed 8-bit value (two's complement).
///
/// ```
/// use disasm8086::bits::signed8;
///
/// assert_eq!(signed8(0xFF), -1);
/// assert_eq!(signed8(0x7F), 127);
/// ```
pub fn signed8(value: u8) -> i8 {
    value as i8
}

/// Reinterprets a raw 16-bit pattern as a signed value (two's complement).
///
/// ```
/// use disasm8086::bits::signed16;
///
/// assert_eq!(signed16(0xFFFF), -1);
/// assert_eq!(signed16(0x8000), i16::MIN);
/// ```
pub fn signed16(value: u16) -> i16 {
    value as i16
}

/// Extracts a sub-field of `width` bits starting at `offset` bits from the
/// low end of `byte`.
pub fn field(byte: u8, offset: u8, width: u8) -> u8 {
    (byte >> offset) & (LOW_4BIT >> (4 - width))
}

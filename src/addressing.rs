//! # Addressing Modes
//!
//! This module defines the 8086 mod/reg/r-m addressing sub-encoding shared
//! by every register/memory instruction family, along with the register and
//! base+index naming tables.
//!
//! The second byte of such instructions splits into three fields:
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! [ mod   |    reg    |    r/m    ]
//! ```
//!
//! The 2-bit `mod` field selects one of four modes that determine how many
//! displacement bytes follow; `reg` and `r/m` are 3-bit register or pattern
//! indices.

use crate::bits::{field, LOW_2BIT};

/// 8-bit register names, indexed by a 3-bit reg/r-m field.
pub const REGISTERS_BYTE: [&str; 8] = ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"];

/// 16-bit register names, indexed by a 3-bit reg/r-m field.
pub const REGISTERS_WORD: [&str; 8] = ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"];

/// Base+index expressions for memory operands, indexed by the r/m field.
///
/// Index 6 ("bp") is special-cased in memory mode with no displacement:
/// there the encoding means a 16-bit direct address instead.
pub const EA_PATTERNS: [&str; 8] = [
    "bx + si", "bx + di", "bp + si", "bp + di", "si", "di", "bp", "bx",
];

/// The r/m value that selects direct addressing in `MemoryMode::Memory`.
pub const DIRECT_ADDRESS_RM: u8 = 0b110;

/// Operand width selected by an instruction's W bit.
///
/// Width picks the register name table and the number of bytes in
/// immediate and displacement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 8-bit operands (`al`..`bh`, 1-byte immediates).
    Byte,
    /// 16-bit operands (`ax`..`di`, 2-byte little-endian immediates).
    Word,
}

impl Width {
    /// Decodes a W bit into a width.
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Width::Word
        } else {
            Width::Byte
        }
    }

    /// Looks up the register name for a 3-bit index at this width.
    pub fn register_name(self, index: u8) -> &'static str {
        match self {
            Width::Byte => REGISTERS_BYTE[(index & 0b111) as usize],
            Width::Word => REGISTERS_WORD[(index & 0b111) as usize],
        }
    }
}

/// Addressing mode from the 2-bit `mod` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMode {
    /// Memory operand, no displacement (except the r/m = 110 direct
    /// address case).
    Memory,
    /// Memory operand followed by an 8-bit signed displacement.
    Memory8,
    /// Memory operand followed by a 16-bit signed displacement.
    Memory16,
    /// Both operands are registers; no further bytes.
    Register,
}

impl MemoryMode {
    /// Decodes the 2-bit `mod` field.
    ///
    /// Returns `None` for values above 3. Callers mask the field to two
    /// bits first, so a `None` here means an internal invariant was
    /// violated; the decoder surfaces it as an unsupported-instruction
    /// error rather than panicking.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(MemoryMode::Memory),
            0b01 => Some(MemoryMode::Memory8),
            0b10 => Some(MemoryMode::Memory16),
            0b11 => Some(MemoryMode::Register),
            _ => None,
        }
    }
}

/// Raw split of a mod/reg/r-m byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRegRm {
    /// 2-bit mode field (bits 7-6), already masked.
    pub mode_bits: u8,
    /// 3-bit register field (bits 5-3).
    pub reg: u8,
    /// 3-bit register-or-memory field (bits 2-0).
    pub rm: u8,
}

impl ModRegRm {
    /// Splits an addressing byte into its three fields.
    pub fn decode(byte: u8) -> Self {
        Self {
            mode_bits: (byte >> 6) & LOW_2BIT,
            reg: field(byte, 3, 3),
            rm: field(byte, 0, 3),
        }
    }

    /// The addressing mode, if the mode bits are in range.
    pub fn mode(&self) -> Option<MemoryMode> {
        MemoryMode::from_bits(self.mode_bits)
    }
}

/// A resolved memory operand.
///
/// Register mode never produces one of these; it is either an absolute
/// 16-bit address (the mod = 00, r/m = 110 exception) or a base+index
/// pattern plus a signed displacement. A displacement of zero renders as
/// the bare pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveAddress {
    /// Direct 16-bit address, e.g. `[1000]`.
    Direct(u16),
    /// Base+index pattern with displacement, e.g. `[bx + si - 5]`.
    /// `pattern` indexes [`EA_PATTERNS`].
    Indexed { pattern: u8, disp: i16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_reg_rm_split() {
        // 0xD8 = 11 011 000: register mode, reg = bx, rm = ax
        let mrr = ModRegRm::decode(0xD8);
        assert_eq!(mrr.mode(), Some(MemoryMode::Register));
        assert_eq!(mrr.reg, 0b011);
        assert_eq!(mrr.rm, 0b000);
    }

    #[test]
    fn test_all_four_modes_decode() {
        assert_eq!(ModRegRm::decode(0b0000_0000).mode(), Some(MemoryMode::Memory));
        assert_eq!(ModRegRm::decode(0b0100_0000).mode(), Some(MemoryMode::Memory8));
        assert_eq!(ModRegRm::decode(0b1000_0000).mode(), Some(MemoryMode::Memory16));
        assert_eq!(ModRegRm::decode(0b1100_0000).mode(), Some(MemoryMode::Register));
    }

    #[test]
    fn test_mode_bits_out_of_range_rejected() {
        assert_eq!(MemoryMode::from_bits(4), None);
        assert_eq!(MemoryMode::from_bits(0xFF), None);
    }

    #[test]
    fn test_register_names_by_width() {
        assert_eq!(Width::Byte.register_name(0), "al");
        assert_eq!(Width::Word.register_name(0), "ax");
        assert_eq!(Width::Byte.register_name(7), "bh");
        assert_eq!(Width::Word.register_name(7), "di");
        assert_eq!(Width::Word.register_name(3), "bx");
    }

    #[test]
    fn test_pattern_table_order() {
        assert_eq!(EA_PATTERNS[0], "bx + si");
        assert_eq!(EA_PATTERNS[DIRECT_ADDRESS_RM as usize], "bp");
        assert_eq!(EA_PATTERNS[7], "bx");
    }
}

//! # 8086 Streaming Disassembler
//!
//! A streaming disassembler for a subset of the 8086 instruction set. It
//! consumes a byte stream of variable-length machine instructions and
//! decodes them one at a time into structured values that render as
//! assembly text.
//!
//! ## Quick Start
//!
//! ```rust
//! use disasm8086::disassembler::disassemble;
//! use disasm8086::disassembler::formatter::format_instruction;
//!
//! // mov bx, ax; je label_0
//! let code = &[0x8B, 0xD8, 0x74, 0x05];
//!
//! let instructions = disassemble(code).unwrap();
//! let lines: Vec<String> = instructions.iter().map(format_instruction).collect();
//!
//! assert_eq!(lines, vec!["mov bx, ax", "je label_0"]);
//! ```
//!
//! ## Architecture
//!
//! - **Byte cursor** (`stream`): buffered cursor over a pluggable
//!   `ByteSource`; refills are invisible to callers, which only see the
//!   logical byte sequence and an absolute position.
//! - **Field extraction** (`bits`): pure mask/shift helpers, little-endian
//!   combination and two's-complement sign extension.
//! - **Addressing decoder** (`addressing`): the mod/reg/r-m sub-encoding
//!   shared by every register/memory instruction family.
//! - **Instruction matcher** (`disassembler::decoder`): priority-ordered
//!   bit-pattern predicates over the leading byte, dispatching to two
//!   generic decode shapes.
//! - **Label resolver** (`labels`): maps absolute branch targets to
//!   sequential `label_N` names.
//! - **Formatter** (`disassembler::formatter`): renders decoded values as
//!   text, one line per instruction.
//!
//! Decoding is single-threaded and fully sequential; the only suspension
//! point is the blocking read when the cursor refills its buffer.

pub mod addressing;
pub mod bits;
pub mod disassembler;
pub mod labels;
pub mod stream;

// Re-export public API
pub use addressing::{EffectiveAddress, MemoryMode, ModRegRm, Width};
pub use disassembler::{disassemble, BranchOp, Disassembler, Instruction, Op};
pub use labels::LabelTable;
pub use stream::{ByteSource, ByteStream, ReaderSource};

/// Errors that can occur while decoding an instruction.
///
/// Both kinds are terminal: the run halts, having already produced all
/// prior instructions. There is no mechanism to skip a malformed
/// instruction and resynchronize on a later byte boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No matcher predicate accepted the leading byte of the current
    /// instruction.
    #[error("unknown instruction: byte = {byte:08b}, position = {position}")]
    UnknownInstruction { byte: u8, position: u64 },

    /// A recognized family reached an addressing mode with no defined
    /// handling. Structurally unreachable while the mode field is masked
    /// to two bits; kept as a safety net for internal invariant
    /// violations.
    #[error("unsupported instruction type: byte = {byte:08b}, position = {position}")]
    UnsupportedInstructionType { byte: u8, position: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_renders_binary_byte_and_position() {
        let err = DecodeError::UnknownInstruction {
            byte: 0xF4,
            position: 5,
        };
        assert_eq!(
            err.to_string(),
            "unknown instruction: byte = 11110100, position = 5"
        );

        let err = DecodeError::UnsupportedInstructionType {
            byte: 0x01,
            position: 0,
        };
        assert_eq!(
            err.to_string(),
            "unsupported instruction type: byte = 00000001, position = 0"
        );
    }
}

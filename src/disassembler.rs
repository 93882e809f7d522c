//! # 8086 Disassembler Module
//!
//! Converts a stream of binary machine code into decoded instructions that
//! the formatter renders as assembly text, one line per instruction.
//!
//! The decode loop pulls bytes through a [`ByteStream`], matches the
//! leading byte against the instruction families in `decoder`, and yields
//! one [`Instruction`] value per successfully matched opcode. A failed
//! match terminates the run; there is no resynchronization on a later
//! byte boundary.

pub mod decoder;
pub mod formatter;

use crate::addressing::{EffectiveAddress, Width};
use crate::labels::LabelTable;
use crate::stream::{ByteSource, ByteStream};
use crate::DecodeError;

/// Arithmetic/move mnemonics that share the register/memory decode shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Mov,
    Add,
    Sub,
    Cmp,
}

impl Op {
    /// Textual mnemonic for this operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Mov => "mov",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Cmp => "cmp",
        }
    }
}

/// Relative-branch mnemonics: conditional jumps and the loop family.
///
/// Each is a single exact opcode byte followed by one signed displacement
/// byte; the full opcode table lives in [`decoder::BRANCH_OPCODES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    Je,
    Jl,
    Jle,
    Jb,
    Jbe,
    Jp,
    Jo,
    Js,
    Jne,
    Jnl,
    Jnle,
    Jnb,
    Jnbe,
    Jnp,
    Jno,
    Jns,
    Loop,
    Loopz,
    Loopnz,
    Jcxz,
}

impl BranchOp {
    /// Textual mnemonic for this branch.
    pub fn mnemonic(self) -> &'static str {
        match self {
            BranchOp::Je => "je",
            BranchOp::Jl => "jl",
            BranchOp::Jle => "jle",
            BranchOp::Jb => "jb",
            BranchOp::Jbe => "jbe",
            BranchOp::Jp => "jp",
            BranchOp::Jo => "jo",
            BranchOp::Js => "js",
            BranchOp::Jne => "jne",
            BranchOp::Jnl => "jnl",
            BranchOp::Jnle => "jnle",
            BranchOp::Jnb => "jnb",
            BranchOp::Jnbe => "jnbe",
            BranchOp::Jnp => "jnp",
            BranchOp::Jno => "jno",
            BranchOp::Jns => "jns",
            BranchOp::Loop => "loop",
            BranchOp::Loopz => "loopz",
            BranchOp::Loopnz => "loopnz",
            BranchOp::Jcxz => "jcxz",
        }
    }
}

/// A single decoded instruction.
///
/// Each variant carries exactly the operands that instruction shape needs.
/// The direction flag (`reg_is_dest`) decides textual operand order only:
/// `reg` and `rm` roles are fixed by the encoding, and the formatter
/// consumes the flag as a print-order swap.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Register-mode pairing of the reg and r/m fields.
    RegisterToRegister {
        op: Op,
        width: Width,
        reg: u8,
        rm: u8,
        reg_is_dest: bool,
    },
    /// The reg register paired against a memory operand.
    RegisterMemory {
        op: Op,
        width: Width,
        reg: u8,
        addr: EffectiveAddress,
        reg_is_dest: bool,
    },
    /// Immediate value into a register (includes the accumulator forms).
    ImmediateToRegister {
        op: Op,
        width: Width,
        reg: u8,
        value: i16,
    },
    /// Immediate value into a memory operand.
    ImmediateToMemory {
        op: Op,
        addr: EffectiveAddress,
        value: i16,
    },
    /// Relative branch to a resolved label.
    Branch { op: BranchOp, label: String },
}

/// Streaming disassembler over a byte source.
///
/// Owns the cursor and the label table for one decode run. Instructions
/// are decoded on demand; a decode error is yielded once and ends the
/// run.
///
/// # Examples
///
/// ```
/// use disasm8086::disassembler::{formatter, Disassembler};
///
/// let bytes: &[u8] = &[0x8B, 0xD8]; // mov bx, ax
/// let mut disasm = Disassembler::new(bytes);
///
/// let instr = disasm.next_instruction().unwrap().unwrap();
/// assert_eq!(formatter::format_instruction(&instr), "mov bx, ax");
/// assert!(disasm.next_instruction().is_none());
/// ```
pub struct Disassembler<S: ByteSource> {
    stream: ByteStream<S>,
    labels: LabelTable,
    failed: bool,
}

impl<S: ByteSource> Disassembler<S> {
    /// Creates a disassembler with a fresh label table.
    pub fn new(source: S) -> Self {
        Self {
            stream: ByteStream::new(source),
            labels: LabelTable::new(),
            failed: false,
        }
    }

    /// Decodes the next instruction from the stream.
    ///
    /// Returns `None` once all input has been consumed, or after an error
    /// has been yielded. May block while the underlying source produces
    /// bytes.
    pub fn next_instruction(&mut self) -> Option<Result<Instruction, DecodeError>> {
        if self.failed {
            return None;
        }
        self.stream.advance();
        if self.stream.at_end() {
            return None;
        }
        match decoder::decode_instruction(&mut self.stream, &mut self.labels) {
            Ok(instr) => Some(Ok(instr)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Disassembles a complete byte slice.
///
/// Convenience wrapper over [`Disassembler`] for in-memory input; stops at
/// the first decode error.
///
/// # Examples
///
/// ```
/// use disasm8086::disassembler::disassemble;
///
/// let instructions = disassemble(&[0x8B, 0xD8]).unwrap();
/// assert_eq!(instructions.len(), 1);
/// ```
pub fn disassemble(bytes: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut disasm = Disassembler::new(bytes);
    let mut instructions = Vec::new();
    while let Some(result) = disasm.next_instruction() {
        instructions.push(result?);
    }
    Ok(instructions)
}

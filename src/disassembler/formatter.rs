//! Formatting of decoded instructions as assembly text.
//!
//! The formatter is a thin consumer of decoded values: all byte
//! consumption and signedness decisions were made by the decoder. The
//! output grammar is `<mnemonic> <operand>[, <operand>]`.

use crate::addressing::{EffectiveAddress, EA_PATTERNS};
use crate::disassembler::Instruction;

/// Formats a single instruction as one line of assembly (no trailing
/// newline).
///
/// # Examples
///
/// ```
/// use disasm8086::disassembler::disassemble;
/// use disasm8086::disassembler::formatter::format_instruction;
///
/// let instructions = disassemble(&[0x8B, 0xD8]).unwrap();
/// assert_eq!(format_instruction(&instructions[0]), "mov bx, ax");
/// ```
pub fn format_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::RegisterToRegister {
            op,
            width,
            reg,
            rm,
            reg_is_dest,
        } => {
            let reg_name = width.register_name(*reg);
            let rm_name = width.register_name(*rm);
            // direction flag swaps print order only
            let (first, second) = if *reg_is_dest {
                (reg_name, rm_name)
            } else {
                (rm_name, reg_name)
            };
            format!("{} {}, {}", op.mnemonic(), first, second)
        }
        Instruction::RegisterMemory {
            op,
            width,
            reg,
            addr,
            reg_is_dest,
        } => {
            let reg_name = width.register_name(*reg);
            let mem = format_effective_address(addr);
            if *reg_is_dest {
                format!("{} {}, {}", op.mnemonic(), reg_name, mem)
            } else {
                format!("{} {}, {}", op.mnemonic(), mem, reg_name)
            }
        }
        Instruction::ImmediateToRegister {
            op,
            width,
            reg,
            value,
        } => {
            format!("{} {}, {}", op.mnemonic(), width.register_name(*reg), value)
        }
        Instruction::ImmediateToMemory { op, addr, value } => {
            format!("{} {}, {}", op.mnemonic(), format_effective_address(addr), value)
        }
        Instruction::Branch { op, label } => format!("{} {}", op.mnemonic(), label),
    }
}

/// Formats a memory operand.
///
/// A zero displacement renders as the bare pattern; nonzero displacements
/// render with `+`/`-` and the absolute magnitude.
pub fn format_effective_address(addr: &EffectiveAddress) -> String {
    match addr {
        EffectiveAddress::Direct(address) => format!("[{}]", address),
        EffectiveAddress::Indexed { pattern, disp } => {
            let pattern = EA_PATTERNS[(*pattern & 0b111) as usize];
            if *disp == 0 {
                format!("[{}]", pattern)
            } else if *disp > 0 {
                format!("[{} + {}]", pattern, disp)
            } else {
                format!("[{} - {}]", pattern, disp.unsigned_abs())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::Width;
    use crate::disassembler::{BranchOp, Op};

    #[test]
    fn test_format_register_to_register_direction() {
        let mut instr = Instruction::RegisterToRegister {
            op: Op::Mov,
            width: Width::Word,
            reg: 0b011,
            rm: 0b000,
            reg_is_dest: true,
        };
        assert_eq!(format_instruction(&instr), "mov bx, ax");

        if let Instruction::RegisterToRegister { reg_is_dest, .. } = &mut instr {
            *reg_is_dest = false;
        }
        assert_eq!(format_instruction(&instr), "mov ax, bx");
    }

    #[test]
    fn test_format_memory_displacements() {
        let zero = EffectiveAddress::Indexed { pattern: 0, disp: 0 };
        let positive = EffectiveAddress::Indexed { pattern: 0, disp: 10 };
        let negative = EffectiveAddress::Indexed { pattern: 0, disp: -5 };

        assert_eq!(format_effective_address(&zero), "[bx + si]");
        assert_eq!(format_effective_address(&positive), "[bx + si + 10]");
        assert_eq!(format_effective_address(&negative), "[bx + si - 5]");
    }

    #[test]
    fn test_format_minimum_displacement() {
        let addr = EffectiveAddress::Indexed {
            pattern: 7,
            disp: i16::MIN,
        };
        assert_eq!(format_effective_address(&addr), "[bx - 32768]");
    }

    #[test]
    fn test_format_direct_address() {
        assert_eq!(format_effective_address(&EffectiveAddress::Direct(1000)), "[1000]");
    }

    #[test]
    fn test_format_immediate_is_signed_decimal() {
        let instr = Instruction::ImmediateToRegister {
            op: Op::Mov,
            width: Width::Byte,
            reg: 1,
            value: -12,
        };
        assert_eq!(format_instruction(&instr), "mov cl, -12");
    }

    #[test]
    fn test_format_branch() {
        let instr = Instruction::Branch {
            op: BranchOp::Jne,
            label: "label_3".to_string(),
        };
        assert_eq!(format_instruction(&instr), "jne label_3");
    }
}

//! Instruction matcher and family decode routines.
//!
//! Matching tries bit-pattern predicates against the leading byte in
//! priority order; the first match commits to that family with no
//! backtracking. The immediate-to-register/memory group is disambiguated
//! only after the addressing byte has been read, using its reg field as a
//! sub-opcode.
//!
//! Two decode shapes recur across families and are implemented once,
//! parameterized over operation, direction flag, operand width and sign
//! extension: `decode_reg_rm_pair` and `decode_imm_rm`.

use log::debug;

use crate::addressing::{EffectiveAddress, MemoryMode, ModRegRm, Width, DIRECT_ADDRESS_RM};
use crate::bits::{self, LOW_1BIT, LOW_3BIT};
use crate::labels::LabelTable;
use crate::stream::{ByteSource, ByteStream};
use crate::DecodeError;

use super::{BranchOp, Instruction, Op};

/// Exact opcode bytes for the relative-branch family.
pub const BRANCH_OPCODES: [(u8, BranchOp); 20] = [
    (0b0111_0100, BranchOp::Je),
    (0b0111_1100, BranchOp::Jl),
    (0b0111_1110, BranchOp::Jle),
    (0b0111_0010, BranchOp::Jb),
    (0b0111_0110, BranchOp::Jbe),
    (0b0111_1010, BranchOp::Jp),
    (0b0111_0000, BranchOp::Jo),
    (0b0111_1000, BranchOp::Js),
    (0b0111_0101, BranchOp::Jne),
    (0b0111_1101, BranchOp::Jnl),
    (0b0111_1111, BranchOp::Jnle),
    (0b0111_0011, BranchOp::Jnb),
    (0b0111_0111, BranchOp::Jnbe),
    (0b0111_1011, BranchOp::Jnp),
    (0b0111_1001, BranchOp::Jns),
    (0b0111_0001, BranchOp::Jno),
    (0b1110_0010, BranchOp::Loop),
    (0b1110_0001, BranchOp::Loopz),
    (0b1110_0000, BranchOp::Loopnz),
    (0b1110_0011, BranchOp::Jcxz),
];

fn branch_op(byte: u8) -> Option<BranchOp> {
    BRANCH_OPCODES
        .iter()
        .find(|(opcode, _)| *opcode == byte)
        .map(|(_, op)| *op)
}

/// Reads a 1- or 2-byte signed value, little-endian, sign-extended to 16
/// bits.
fn read_signed<S: ByteSource>(stream: &mut ByteStream<S>, word: bool) -> i16 {
    if word {
        let low = stream.read_next();
        let high = stream.read_next();
        bits::signed16(bits::combine(high, low))
    } else {
        i16::from(bits::signed8(stream.read_next()))
    }
}

/// Reads a 16-bit unsigned direct address, little-endian.
fn read_address<S: ByteSource>(stream: &mut ByteStream<S>) -> u16 {
    let low = stream.read_next();
    let high = stream.read_next();
    bits::combine(high, low)
}

/// Reads the immediate for the immediate-to-register/memory group.
///
/// The sign-extend bit suppresses the second immediate byte only in the
/// word + sign-extend combination; otherwise width governs exactly.
fn read_immediate<S: ByteSource>(stream: &mut ByteStream<S>, sign_extend: bool, width: Width) -> i16 {
    read_signed(stream, width == Width::Word && !sign_extend)
}

/// Resolves a memory operand, consuming the displacement bytes the mode
/// implies. Register mode is handled by the callers and never reaches
/// here.
fn read_effective_address<S: ByteSource>(
    stream: &mut ByteStream<S>,
    mode: MemoryMode,
    rm: u8,
) -> EffectiveAddress {
    match mode {
        // r/m = 110 means a 16-bit direct address, not the "bp" pattern
        MemoryMode::Memory if rm == DIRECT_ADDRESS_RM => {
            EffectiveAddress::Direct(read_address(stream))
        }
        MemoryMode::Memory => EffectiveAddress::Indexed {
            pattern: rm,
            disp: 0,
        },
        MemoryMode::Memory8 => EffectiveAddress::Indexed {
            pattern: rm,
            disp: read_signed(stream, false),
        },
        MemoryMode::Memory16 => EffectiveAddress::Indexed {
            pattern: rm,
            disp: read_signed(stream, true),
        },
        MemoryMode::Register => unreachable!("register mode has no effective address"),
    }
}

/// Decode shape: reg/memory with register to either.
///
/// Used by mov, add, sub and cmp. Reads the addressing byte and any
/// displacement it implies; the direction flag is carried through to the
/// formatter untouched.
fn decode_reg_rm_pair<S: ByteSource>(
    stream: &mut ByteStream<S>,
    op: Op,
    reg_is_dest: bool,
    width: Width,
) -> Result<Instruction, DecodeError> {
    let addr_byte = stream.read_next();
    let position = stream.position();
    let mrr = ModRegRm::decode(addr_byte);
    let mode = mrr
        .mode()
        .ok_or(DecodeError::UnsupportedInstructionType {
            byte: addr_byte,
            position,
        })?;

    if mode == MemoryMode::Register {
        return Ok(Instruction::RegisterToRegister {
            op,
            width,
            reg: mrr.reg,
            rm: mrr.rm,
            reg_is_dest,
        });
    }

    let addr = read_effective_address(stream, mode, mrr.rm);
    Ok(Instruction::RegisterMemory {
        op,
        width,
        reg: mrr.reg,
        addr,
        reg_is_dest,
    })
}

/// Decode shape: immediate to register/memory, with optional sign
/// extension.
///
/// Used by the add/sub/cmp group behind the `100000sw` prefix. The
/// addressing byte has already been read by the matcher to extract the
/// sub-opcode; displacement bytes are consumed before the immediate.
fn decode_imm_rm<S: ByteSource>(
    stream: &mut ByteStream<S>,
    op: Op,
    sign_extend: bool,
    width: Width,
    mrr: ModRegRm,
    addr_byte: u8,
) -> Result<Instruction, DecodeError> {
    let position = stream.position();
    let mode = mrr
        .mode()
        .ok_or(DecodeError::UnsupportedInstructionType {
            byte: addr_byte,
            position,
        })?;

    if mode == MemoryMode::Register {
        let value = read_immediate(stream, sign_extend, width);
        return Ok(Instruction::ImmediateToRegister {
            op,
            width,
            reg: mrr.rm,
            value,
        });
    }

    let addr = read_effective_address(stream, mode, mrr.rm);
    let value = read_immediate(stream, sign_extend, width);
    Ok(Instruction::ImmediateToMemory { op, addr, value })
}

/// Matches and decodes one instruction starting at the stream's current
/// byte.
///
/// On success the stream's current byte is the last byte of the decoded
/// instruction; the caller advances past it before the next decode.
pub fn decode_instruction<S: ByteSource>(
    stream: &mut ByteStream<S>,
    labels: &mut LabelTable,
) -> Result<Instruction, DecodeError> {
    let byte = stream.current();
    let position = stream.position();

    // mov - register/memory to/from register
    if byte >> 2 == 0b10_0010 {
        let reg_is_dest = (byte >> 1) & LOW_1BIT != 0;
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        return decode_reg_rm_pair(stream, Op::Mov, reg_is_dest, width);
    }

    // mov - immediate to register
    if byte >> 4 == 0b1011 {
        let width = Width::from_bit((byte >> 3) & LOW_1BIT != 0);
        let reg = byte & LOW_3BIT;
        let value = read_signed(stream, width == Width::Word);
        return Ok(Instruction::ImmediateToRegister {
            op: Op::Mov,
            width,
            reg,
            value,
        });
    }

    // add - reg/memory with register to either
    if byte >> 2 == 0b00_0000 {
        let reg_is_dest = (byte >> 1) & LOW_1BIT != 0;
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        return decode_reg_rm_pair(stream, Op::Add, reg_is_dest, width);
    }

    // cmp - reg/memory with register to either
    if byte >> 2 == 0b00_1110 {
        let reg_is_dest = (byte >> 1) & LOW_1BIT != 0;
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        return decode_reg_rm_pair(stream, Op::Cmp, reg_is_dest, width);
    }

    // add - immediate to accumulator
    if byte >> 1 == 0b000_0010 {
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        let value = read_signed(stream, width == Width::Word);
        return Ok(Instruction::ImmediateToRegister {
            op: Op::Add,
            width,
            reg: 0,
            value,
        });
    }

    // sub - immediate from accumulator
    if byte >> 1 == 0b001_0110 {
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        let value = read_signed(stream, width == Width::Word);
        return Ok(Instruction::ImmediateToRegister {
            op: Op::Sub,
            width,
            reg: 0,
            value,
        });
    }

    // cmp - immediate with accumulator
    if byte >> 1 == 0b001_1110 {
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        let value = read_signed(stream, width == Width::Word);
        return Ok(Instruction::ImmediateToRegister {
            op: Op::Cmp,
            width,
            reg: 0,
            value,
        });
    }

    // sub - reg/memory with register to either
    if byte >> 2 == 0b00_1010 {
        let reg_is_dest = (byte >> 1) & LOW_1BIT != 0;
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        return decode_reg_rm_pair(stream, Op::Sub, reg_is_dest, width);
    }

    // add/sub/cmp - immediate to register/memory, reg field is the
    // sub-opcode
    if byte >> 2 == 0b10_0000 {
        let sign_extend = (byte >> 1) & LOW_1BIT != 0;
        let width = Width::from_bit(byte & LOW_1BIT != 0);
        let addr_byte = stream.read_next();
        let mrr = ModRegRm::decode(addr_byte);
        let op = match mrr.reg {
            0b000 => Op::Add,
            0b101 => Op::Sub,
            0b111 => Op::Cmp,
            _ => return Err(DecodeError::UnknownInstruction { byte, position }),
        };
        return decode_imm_rm(stream, op, sign_extend, width, mrr, addr_byte);
    }

    // conditional jumps and loops - exact opcode plus one signed
    // displacement byte
    if let Some(op) = branch_op(byte) {
        let disp = read_signed(stream, false);
        // the reference point is the position of the next instruction
        let target = (stream.position() as i64 + 1 + i64::from(disp)) as u64;
        let label = labels.resolve(target).to_string();
        return Ok(Instruction::Branch { op, label });
    }

    debug!("no predicate matched byte {:08b} at position {}", byte, position);
    Err(DecodeError::UnknownInstruction { byte, position })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(bytes: &[u8]) -> Result<Instruction, DecodeError> {
        let mut stream = ByteStream::new(bytes);
        let mut labels = LabelTable::new();
        stream.advance();
        decode_instruction(&mut stream, &mut labels)
    }

    #[test]
    fn test_decode_mov_register_to_register() {
        // 0x8B 0xD8: d=1 w=1, register mode, reg=bx, rm=ax
        let instr = decode_one(&[0x8B, 0xD8]).unwrap();
        assert_eq!(
            instr,
            Instruction::RegisterToRegister {
                op: Op::Mov,
                width: Width::Word,
                reg: 0b011,
                rm: 0b000,
                reg_is_dest: true,
            }
        );
    }

    #[test]
    fn test_decode_direct_address_exception() {
        // mod=00, r/m=110 reads a 16-bit absolute address
        let instr = decode_one(&[0x8B, 0b00_010_110, 0xE8, 0x03]).unwrap();
        assert_eq!(
            instr,
            Instruction::RegisterMemory {
                op: Op::Mov,
                width: Width::Word,
                reg: 0b010,
                addr: EffectiveAddress::Direct(1000),
                reg_is_dest: true,
            }
        );
    }

    #[test]
    fn test_decode_unknown_instruction() {
        let err = decode_one(&[0xF4]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownInstruction {
                byte: 0xF4,
                position: 0
            }
        );
    }

    #[test]
    fn test_imm_group_rejects_undefined_sub_opcode() {
        // reg field 001 selects no operation in this group
        let err = decode_one(&[0x80, 0b11_001_000, 0x01]).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownInstruction { byte: 0x80, .. }));
    }

    #[test]
    fn test_sign_extend_word_reads_one_immediate_byte() {
        // 0x83: s=1 w=1, register mode rm=cx, one immediate byte 0xFF -> -1
        let instr = decode_one(&[0x83, 0b11_000_001, 0xFF]).unwrap();
        assert_eq!(
            instr,
            Instruction::ImmediateToRegister {
                op: Op::Add,
                width: Width::Word,
                reg: 0b001,
                value: -1,
            }
        );
    }

    #[test]
    fn test_no_sign_extend_word_reads_two_immediate_bytes() {
        // 0x81: s=0 w=1, two immediate bytes little-endian
        let instr = decode_one(&[0x81, 0b11_000_001, 0x02, 0x01]).unwrap();
        assert_eq!(
            instr,
            Instruction::ImmediateToRegister {
                op: Op::Add,
                width: Width::Word,
                reg: 0b001,
                value: 0x0102,
            }
        );
    }

    #[test]
    fn test_branch_target_is_relative_to_next_instruction() {
        let mut stream = ByteStream::new([0x74u8, 0x05].as_slice());
        let mut labels = LabelTable::new();
        stream.advance();
        let instr = decode_instruction(&mut stream, &mut labels).unwrap();
        // target = 2 (next instruction) + 5
        assert_eq!(
            instr,
            Instruction::Branch {
                op: BranchOp::Je,
                label: "label_0".to_string(),
            }
        );
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_every_branch_opcode_decodes() {
        for (opcode, op) in BRANCH_OPCODES {
            let instr = decode_one(&[opcode, 0x00]).unwrap();
            match instr {
                Instruction::Branch { op: decoded, .. } => assert_eq!(decoded, op),
                other => panic!("expected branch for {:#04X}, got {:?}", opcode, other),
            }
        }
    }
}

//! Command-line disassembler: bytes in, assembly text out.
//!
//! Reads machine code from a file given as the first argument, or from
//! stdin when no argument is supplied, and prints one line of assembly
//! per instruction. On a decode error the diagnostic goes to stderr and
//! the process exits nonzero, after all prior instructions have been
//! printed.

use std::fs::File;
use std::io::{self, Read};

use anyhow::Result;

use disasm8086::disassembler::formatter::format_instruction;
use disasm8086::{Disassembler, ReaderSource};

fn run<R: Read>(reader: R) -> Result<()> {
    let mut disasm = Disassembler::new(ReaderSource::new(reader));
    while let Some(result) = disasm.next_instruction() {
        let instr = result?;
        println!("{}", format_instruction(&instr));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    match std::env::args().nth(1) {
        Some(path) => run(File::open(path)?),
        None => run(io::stdin().lock()),
    }
}

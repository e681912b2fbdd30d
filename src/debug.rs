//! Debug utilities for inspecting bytecode
//!
//! Listings use one line per instruction, prefixed by its index, so jump
//! targets can be followed by eye.

use crate::bytecode::{Instruction, Program};
use std::fmt::Write;

/// Format a single instruction with its index
pub fn format_instruction(index: usize, instr: &Instruction) -> String {
    format!("{:4}: {}", index, instr)
}

/// Render a whole program as a listing
pub fn listing(program: &Program) -> String {
    let mut out = String::new();
    for (i, instr) in program.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", format_instruction(i, instr).trim_end());
    }
    out
}

/// Render the raw and optimized programs next to each other
pub fn side_by_side(raw: &Program, optimized: &Program) -> String {
    let mut out = String::new();
    for (i, (left, right)) in raw.iter().zip(optimized.iter()).enumerate() {
        let marker = if left == right { ' ' } else { '*' };
        let _ = writeln!(
            out,
            "{:4}: {:<16}{} {}",
            i,
            left.to_string(),
            marker,
            right
        );
    }
    out
}

/// Print a program listing to stdout
pub fn dump_program(program: &Program) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                    BYTECODE DUMP");
    println!("═══════════════════════════════════════════════════════════");
    println!("Instructions: {}", program.len());
    println!("───────────────────────────────────────────────────────────");
    print!("{}", listing(program));
    println!("═══════════════════════════════════════════════════════════\n");
}

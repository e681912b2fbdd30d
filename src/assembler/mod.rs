//! Assembly of source text into bytecode
//!
//! Converts the eight command symbols of a source program into a
//! [`Program`](crate::bytecode::Program) with every loop jump resolved.
//! Any other byte is a comment.

mod scanner;

pub use scanner::Assembler;

use crate::bytecode::Program;
use crate::error::Result;

/// Assemble source bytes into a program with resolved jump targets
pub fn assemble(source: &[u8]) -> Result<Program> {
    Assembler::new(source).assemble()
}

//! # Bytecode for the tape virtual machine
//!
//! The assembler, the optimizer and the executor all work on the same
//! representation: a flat sequence of [`Instruction`]s in which every jump
//! carries an absolute index into that sequence.
//!
//! ## Module Structure
//!
//! ```text
//! bytecode/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── instruction.rs  # Instruction and JumpCondition
//! └── program.rs      # Program (owned instruction sequence)
//! ```
//!
//! ## Index stability
//!
//! Passes over a [`Program`] replace instructions in place and never insert
//! or remove any, so jump targets resolved by the assembler stay valid for
//! the lifetime of the program.

mod instruction;
mod program;

pub use instruction::{Instruction, JumpCondition};
pub use program::Program;

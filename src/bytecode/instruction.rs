//! Instruction definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition tested by a [`Instruction::Jump`] against the current cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpCondition {
    /// Jump when the current cell is zero (loop entry)
    IfZero,
    /// Jump when the current cell is non-zero (loop back-edge)
    IfNotZero,
}

impl JumpCondition {
    /// Evaluate the condition against a cell value
    pub fn holds(self, cell: i32) -> bool {
        match self {
            JumpCondition::IfZero => cell == 0,
            JumpCondition::IfNotZero => cell != 0,
        }
    }
}

/// Tape machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    // Cell arithmetic
    /// Add to the current cell
    Inc(u32),
    /// Subtract from the current cell
    Dec(u32),

    // Pointer movement
    /// Move the pointer towards higher cells
    ShiftRight(i32),
    /// Move the pointer towards lower cells
    ShiftLeft(i32),

    /// Force the cell at `pointer + offset` to `value`
    SetAbsolute {
        /// Cell offset relative to the pointer
        offset: i32,
        /// Value to store
        value: i32,
    },

    // I/O
    /// Read one byte into the current cell
    Input,
    /// Write the low byte of the current cell
    Output,

    // Control flow
    /// Conditional jump to an absolute instruction index
    Jump {
        /// Condition tested against the current cell
        condition: JumpCondition,
        /// Index the program counter is set to when the condition holds
        target: usize,
    },

    // Closed-form loop blocks (optimizer output)
    /// Add `scratch * multiplier` to the cell at `pointer + offset`
    MultiplyAdd {
        /// Cell offset relative to the pointer
        offset: i32,
        /// Per-iteration delta of the rewritten loop at that offset
        multiplier: i32,
    },
    /// Move the current cell into the scratch register and zero the cell
    ZeroStore,

    /// No operation (filler inside rewritten blocks)
    Nop,
}

impl Instruction {
    /// Jump target of an unresolved open jump while assembling
    pub const UNRESOLVED: usize = usize::MAX;

    /// Loop entry jump with the given target
    pub fn open(target: usize) -> Self {
        Instruction::Jump {
            condition: JumpCondition::IfZero,
            target,
        }
    }

    /// Loop back-edge jump with the given target
    pub fn close(target: usize) -> Self {
        Instruction::Jump {
            condition: JumpCondition::IfNotZero,
            target,
        }
    }

    /// Clear the current cell
    pub fn clear() -> Self {
        Instruction::SetAbsolute {
            offset: 0,
            value: 0,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Inc(n) => write!(f, "+ {}", n),
            Instruction::Dec(n) => write!(f, "- {}", n),
            Instruction::ShiftRight(n) => write!(f, "> {}", n),
            Instruction::ShiftLeft(n) => write!(f, "< {}", n),
            Instruction::SetAbsolute { offset: 0, value } => write!(f, "= {}", value),
            Instruction::SetAbsolute { offset, value } => write!(f, "[{}] = {}", offset, value),
            Instruction::Input => f.write_str("cin<<"),
            Instruction::Output => f.write_str("cout>>"),
            Instruction::Jump { condition, target } => {
                let sign = match condition {
                    JumpCondition::IfZero => '=',
                    JumpCondition::IfNotZero => '!',
                };
                write!(f, "=> {}0 | {}", sign, target)
            }
            Instruction::MultiplyAdd { offset, multiplier } => {
                write!(f, "x>>[{}]*{}", offset, multiplier)
            }
            Instruction::ZeroStore => f.write_str("x<<"),
            Instruction::Nop => Ok(()),
        }
    }
}

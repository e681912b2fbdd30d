//! Owned instruction sequence

use super::instruction::{Instruction, JumpCondition};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Complete bytecode program
///
/// Mutable access is only ever handed out as a slice, so a pass can rewrite
/// instructions but cannot change the length of the program. Programs
/// serialize with serde, so an optimized program can be stored as JSON and
/// reloaded without reassembling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already assembled instruction vector
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// In-place access for rewriting passes
    pub fn instructions_mut(&mut self) -> &mut [Instruction] {
        &mut self.instructions
    }

    pub(crate) fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Check that every open jump is paired with a back-edge and every
    /// target lies within `0..=len`.
    ///
    /// An open jump at `p` targeting `t` must be matched by a back-edge at
    /// `t - 1` targeting `p + 1`. Back-edges inside blocks produced by the
    /// optimizer are open jumps themselves and are checked the same way.
    pub fn check_jumps(&self) -> bool {
        let len = self.instructions.len();
        self.instructions.iter().enumerate().all(|(pos, instr)| {
            let Instruction::Jump { condition, target } = *instr else {
                return true;
            };
            if target > len || target == 0 {
                return false;
            }
            match condition {
                JumpCondition::IfZero => match self.instructions[target - 1] {
                    // Back-edge of an ordinary loop
                    Instruction::Jump {
                        condition: JumpCondition::IfNotZero,
                        target: back,
                    } => back == pos + 1,
                    // Tail of a rewritten block, or the block guard that skips it
                    Instruction::Jump {
                        condition: JumpCondition::IfZero,
                        target: tail,
                    } => tail == target,
                    _ => false,
                },
                JumpCondition::IfNotZero => matches!(
                    self.instructions[target - 1],
                    Instruction::Jump {
                        condition: JumpCondition::IfZero,
                        target: open,
                    } if open == pos + 1
                ),
            }
        })
    }
}

impl Deref for Program {
    type Target = [Instruction];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::from_instructions(instructions)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

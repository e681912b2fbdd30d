//! Fetch/dispatch loop

use super::io::OutputSink;
use super::tape::Tape;
use crate::bytecode::{Instruction, Program};
use crate::config::{EofPolicy, VmConfig};
use crate::error::{Error, Result};

/// Outcome of executing at most one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// The program counter was already past the last instruction
    Done,
    /// An ordinary instruction ran
    Continue,
    /// A jump ran while the current cell was zero (a loop was skipped or left)
    Checkpoint,
}

/// Final state of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult<O = Vec<u8>> {
    /// Output sink, holding everything written by `Output`
    pub output: O,
    /// Final tape contents
    pub tape: Vec<i32>,
    /// Final pointer position
    pub pointer: i64,
    /// Number of executed instructions
    pub steps: u64,
}

/// Bytecode interpreter over one tape
#[derive(Debug)]
pub struct Executor<'a, I, O> {
    instructions: &'a [Instruction],
    pc: usize,
    tape: Tape,
    /// Counter captured by the last `ZeroStore`
    scratch: i32,
    /// Whether a `ZeroStore` has run yet
    scratch_loaded: bool,
    input: I,
    output: O,
    eof: EofPolicy,
    max_steps: Option<u64>,
    steps: u64,
}

impl<'a, I, O> Executor<'a, I, O>
where
    I: Iterator<Item = u8>,
    O: OutputSink,
{
    /// Create an executor with a fresh tape
    pub fn new(program: &'a Program, config: &VmConfig, input: I, output: O) -> Self {
        Self {
            instructions: program,
            pc: 0,
            tape: Tape::new(config.tape_size, config.start_pointer),
            scratch: 0,
            scratch_loaded: false,
            input,
            output,
            eof: config.eof,
            max_steps: config.max_steps,
            steps: 0,
        }
    }

    /// True once the program counter has left the program
    pub fn is_done(&self) -> bool {
        self.pc >= self.instructions.len()
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Pointer position
    pub fn pointer(&self) -> i64 {
        self.tape.pointer()
    }

    /// Current tape
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Scratch register
    pub fn scratch(&self) -> i32 {
        self.scratch
    }

    /// Number of executed instructions
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Output sink
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Executes one instruction.
    ///
    /// Returns `true` if the program was already complete before the call.
    pub fn step(&mut self) -> Result<bool> {
        Ok(self.step_event()? == StepEvent::Done)
    }

    /// Executes one instruction and reports what kind of step it was
    pub fn step_event(&mut self) -> Result<StepEvent> {
        let Some(&current) = self.instructions.get(self.pc) else {
            return Ok(StepEvent::Done);
        };

        if let Some(limit) = self.max_steps {
            if self.steps >= limit {
                return Err(Error::ExecutionLimitExceeded { limit });
            }
        }
        self.steps += 1;

        let mut event = StepEvent::Continue;
        let mut next = self.pc + 1;

        match current {
            Instruction::Inc(n) => {
                let cell = self.tape.cell_mut(0)?;
                *cell = cell.wrapping_add(n as i32);
            }
            Instruction::Dec(n) => {
                let cell = self.tape.cell_mut(0)?;
                *cell = cell.wrapping_sub(n as i32);
            }
            Instruction::ShiftRight(n) => self.tape.shift(i64::from(n)),
            Instruction::ShiftLeft(n) => self.tape.shift(-i64::from(n)),
            Instruction::SetAbsolute { offset, value } => {
                *self.tape.cell_mut(offset)? = value;
            }
            Instruction::Input => {
                let cell = self.tape.cell_mut(0)?;
                match self.input.next() {
                    Some(byte) => *cell = i32::from(byte),
                    None => match self.eof {
                        EofPolicy::MinusOne => *cell = -1,
                        EofPolicy::Zero => *cell = 0,
                        EofPolicy::Unchanged => {}
                    },
                }
            }
            Instruction::Output => {
                let byte = self.tape.get(0)? as u8;
                self.output.write_byte(byte)?;
            }
            Instruction::Jump { condition, target } => {
                let cell = self.tape.get(0)?;
                if cell == 0 {
                    event = StepEvent::Checkpoint;
                }
                if condition.holds(cell) {
                    next = target;
                }
            }
            Instruction::ZeroStore => {
                let cell = self.tape.cell_mut(0)?;
                self.scratch = *cell;
                *cell = 0;
                self.scratch_loaded = true;
            }
            Instruction::MultiplyAdd { offset, multiplier } => {
                debug_assert!(
                    self.scratch_loaded,
                    "MultiplyAdd at {} before any ZeroStore",
                    self.pc
                );
                let product = self.scratch.wrapping_mul(multiplier);
                let cell = self.tape.cell_mut(offset)?;
                *cell = cell.wrapping_add(product);
            }
            Instruction::Nop => {}
        }

        self.pc = next;
        Ok(event)
    }

    /// Runs to completion
    pub fn run(mut self) -> Result<ExecutionResult<O>> {
        while !self.step()? {}
        self.output.flush()?;
        Ok(self.into_result())
    }

    /// Final state, whether or not the program has completed
    pub fn into_result(self) -> ExecutionResult<O> {
        ExecutionResult {
            pointer: self.tape.pointer(),
            tape: self.tape.into_cells(),
            output: self.output,
            steps: self.steps,
        }
    }
}

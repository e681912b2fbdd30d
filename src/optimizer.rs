//! # Linear loop optimizer
//!
//! Rewrites *linear loops* into closed-form blocks. A loop is linear when
//! its body:
//! - returns the pointer to the starting cell (zero net shift),
//! - changes the starting cell (the counter) by exactly -1 per iteration,
//! - performs no I/O.
//!
//! Such a loop runs `v` times where `v` is the counter on entry, so every
//! other touched cell simply gains `v * delta`. The rewrite keeps the open
//! jump as a guard for `v == 0` and replaces the body in place:
//!
//! ```text
//! [->++>>+<<<]    =>   => =0 | end
//!                      x<<
//!                      x>>[1]*2
//!                      x>>[3]*1
//!                      (nop ...)
//!                      => =0 | end
//! ```
//!
//! Instructions are only ever replaced, so jump targets elsewhere in the
//! program remain valid.

use crate::bytecode::{Instruction, JumpCondition, Program};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Advisory diagnostics raised while optimizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeWarning {
    /// Loop shaped like a linear loop whose counter never changes
    PossibleInfiniteLoop {
        /// Index of the loop's open jump
        index: usize,
    },
}

impl fmt::Display for OptimizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeWarning::PossibleInfiniteLoop { index } => write!(
                f,
                "possible infinite loop at instruction {}: counter cell never changes",
                index
            ),
        }
    }
}

/// Output of an optimizer run
#[derive(Debug, Clone)]
pub struct Optimized {
    /// Rewritten program, same length as the input
    pub program: Program,
    /// Diagnostics raised during the scan
    pub warnings: Vec<OptimizeWarning>,
    /// Number of loops rewritten into closed form
    pub rewritten_loops: usize,
}

/// Optimize an owned program
pub fn optimize(program: Program) -> Optimized {
    Optimizer::new().optimize(program)
}

/// Why a candidate loop was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Io,
    NetShift,
    CounterUntouched,
    CounterUnchanged,
    CounterStep,
    CounterCleared,
    WriteAfterClear,
}

/// Analysis state for the loop currently being scanned
#[derive(Debug)]
struct LoopScan {
    /// Index of the open jump
    open: usize,
    /// Pointer displacement so far, relative to the loop's starting cell
    net_shift: i64,
    /// Accumulated per-iteration delta by offset
    delta: BTreeMap<i64, i64>,
    /// Offsets cleared by a nested `SetAbsolute`
    cleared: BTreeSet<i64>,
}

impl LoopScan {
    fn new(open: usize) -> Self {
        Self {
            open,
            net_shift: 0,
            delta: BTreeMap::new(),
            cleared: BTreeSet::new(),
        }
    }

    fn add(&mut self, amount: i64) -> Result<(), Rejection> {
        if self.cleared.contains(&self.net_shift) {
            return Err(Rejection::WriteAfterClear);
        }
        *self.delta.entry(self.net_shift).or_insert(0) += amount;
        Ok(())
    }

    /// Feed one body instruction
    fn visit(&mut self, instr: &Instruction) -> Result<(), Rejection> {
        match *instr {
            Instruction::Inc(n) => self.add(i64::from(n))?,
            Instruction::Dec(n) => self.add(-i64::from(n))?,
            Instruction::ShiftRight(n) => self.net_shift += i64::from(n),
            Instruction::ShiftLeft(n) => self.net_shift -= i64::from(n),
            Instruction::SetAbsolute { offset, .. } => {
                self.cleared.insert(self.net_shift + i64::from(offset));
            }
            Instruction::Input | Instruction::Output => return Err(Rejection::Io),
            Instruction::Jump { .. }
            | Instruction::MultiplyAdd { .. }
            | Instruction::ZeroStore
            | Instruction::Nop => {}
        }
        Ok(())
    }

    /// Decide whether the completed body is linear
    fn classify(&self) -> Result<(), Rejection> {
        if self.net_shift != 0 {
            return Err(Rejection::NetShift);
        }
        // A cleared counter ends the loop after one pass
        if self.cleared.contains(&0) {
            return Err(Rejection::CounterCleared);
        }
        match self.delta.get(&0) {
            None => Err(Rejection::CounterUntouched),
            Some(0) => Err(Rejection::CounterUnchanged),
            Some(-1) => Ok(()),
            Some(_) => Err(Rejection::CounterStep),
        }
    }

    /// Closed-form replacement for `open + 1 ..= close`
    fn emit(&self, close: usize) -> Vec<Instruction> {
        let mut block = Vec::with_capacity(close - self.open);
        block.push(Instruction::ZeroStore);

        for (&offset, &mult) in &self.delta {
            if offset == 0 || mult == 0 {
                continue;
            }
            block.push(Instruction::MultiplyAdd {
                offset: offset as i32,
                multiplier: mult as i32,
            });
        }

        for &offset in &self.cleared {
            block.push(Instruction::SetAbsolute {
                offset: offset as i32,
                value: 0,
            });
        }

        debug_assert!(block.len() < close - self.open, "rewrite must fit the body");
        block.resize(close - self.open - 1, Instruction::Nop);
        block.push(Instruction::open(close + 1));
        block
    }
}

/// Single-pass linear loop optimizer
#[derive(Debug, Default)]
pub struct Optimizer {
    warnings: Vec<OptimizeWarning>,
    rewritten_loops: usize,
}

impl Optimizer {
    /// Create a new optimizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the pass over an owned program
    pub fn optimize(mut self, mut program: Program) -> Optimized {
        let len = program.len();
        self.rewrite_linear_loops(&mut program);
        debug_assert_eq!(program.len(), len);

        tracing::debug!(
            instructions = len,
            rewritten = self.rewritten_loops,
            warnings = self.warnings.len(),
            "optimized program"
        );

        Optimized {
            program,
            warnings: self.warnings,
            rewritten_loops: self.rewritten_loops,
        }
    }

    /// Scan left to right, rewriting each innermost linear loop
    fn rewrite_linear_loops(&mut self, program: &mut Program) {
        let instructions = program.instructions_mut();
        let mut scan: Option<LoopScan> = None;

        for i in 0..instructions.len() {
            let instr = instructions[i];

            match instr {
                Instruction::Jump {
                    condition: JumpCondition::IfZero,
                    ..
                } => {
                    // A nested open discards the enclosing candidate
                    scan = Some(LoopScan::new(i));
                }
                Instruction::Jump {
                    condition: JumpCondition::IfNotZero,
                    target,
                } => {
                    let Some(current) = scan.take() else {
                        continue;
                    };
                    if target != current.open + 1 {
                        continue;
                    }
                    match current.classify() {
                        Ok(()) => {
                            let block = current.emit(i);
                            instructions[current.open + 1..=i].copy_from_slice(&block);
                            self.rewritten_loops += 1;
                            tracing::trace!(open = current.open, close = i, "rewrote linear loop");
                        }
                        Err(Rejection::CounterUnchanged) => {
                            let warning =
                                OptimizeWarning::PossibleInfiniteLoop { index: current.open };
                            tracing::warn!("{}", warning);
                            self.warnings.push(warning);
                        }
                        Err(reason) => {
                            tracing::trace!(open = current.open, ?reason, "loop not linear");
                        }
                    }
                }
                _ => {
                    if let Some(current) = scan.as_mut() {
                        if let Err(reason) = current.visit(&instr) {
                            tracing::trace!(open = current.open, ?reason, "loop not linear");
                            scan = None;
                        }
                    }
                }
            }
        }
    }
}

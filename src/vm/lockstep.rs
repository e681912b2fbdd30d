//! Lockstep validation of an optimized program against its raw form
//!
//! Both programs run on independent tapes with independent copies of the
//! input. Each run advances to its next checkpoint (a jump taken on a zero
//! cell, or program end) and the two states are compared. Rewritten loops
//! end in a jump on their zeroed counter, so every loop exit in the raw run
//! lines up with exactly one checkpoint in the optimized run.

use super::executor::{Executor, StepEvent};
use crate::bytecode::Program;
use crate::config::VmConfig;
use crate::error::{Error, Result};

/// Summary of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Checkpoints at which both runs agreed
    pub checkpoints: u64,
    /// Instructions executed by the raw program
    pub raw_steps: u64,
    /// Instructions executed by the optimized program
    pub optimized_steps: u64,
    /// Output shared by both runs
    pub output: Vec<u8>,
}

type ByteExecutor<'a, 'b> = Executor<'a, std::iter::Copied<std::slice::Iter<'b, u8>>, Vec<u8>>;

/// Run `raw` and `optimized` side by side and fail on the first divergence
pub fn validate(
    raw: &Program,
    optimized: &Program,
    config: &VmConfig,
    input: &[u8],
) -> Result<ValidationReport> {
    if raw.len() != optimized.len() {
        return Err(Error::Diverged {
            checkpoint: 0,
            pc: 0,
            reason: format!(
                "program lengths differ: raw {} vs optimized {}",
                raw.len(),
                optimized.len()
            ),
        });
    }

    let mut left = Executor::new(raw, config, input.iter().copied(), Vec::new());
    let mut right = Executor::new(optimized, config, input.iter().copied(), Vec::new());
    let mut checkpoints = 0u64;

    loop {
        let left_event = advance(&mut left)?;
        let right_event = advance(&mut right)?;

        if let Some(reason) = compare(&left, &right, left_event, right_event) {
            tracing::warn!(checkpoint = checkpoints, pc = left.pc(), "{}", reason);
            return Err(Error::Diverged {
                checkpoint: checkpoints,
                pc: left.pc(),
                reason,
            });
        }

        if left_event == StepEvent::Done {
            break;
        }
        checkpoints += 1;
    }

    tracing::debug!(
        checkpoints,
        raw_steps = left.steps(),
        optimized_steps = right.steps(),
        "optimized program matches raw program"
    );

    let raw_steps = left.steps();
    let optimized_steps = right.steps();
    Ok(ValidationReport {
        checkpoints,
        raw_steps,
        optimized_steps,
        output: left.into_result().output,
    })
}

/// Step until the next checkpoint or program end
fn advance(executor: &mut ByteExecutor<'_, '_>) -> Result<StepEvent> {
    loop {
        match executor.step_event()? {
            StepEvent::Continue => {}
            event => return Ok(event),
        }
    }
}

fn compare(
    left: &ByteExecutor<'_, '_>,
    right: &ByteExecutor<'_, '_>,
    left_event: StepEvent,
    right_event: StepEvent,
) -> Option<String> {
    if left_event != right_event {
        return Some(format!(
            "raw run reached {:?} but optimized run reached {:?}",
            left_event, right_event
        ));
    }
    if left.pc() != right.pc() {
        return Some(format!(
            "program counters differ: raw {} vs optimized {}",
            left.pc(),
            right.pc()
        ));
    }
    if left.pointer() != right.pointer() {
        return Some(format!(
            "pointers differ: raw {} vs optimized {}",
            left.pointer(),
            right.pointer()
        ));
    }
    let (left_cells, right_cells) = (left.tape().cells(), right.tape().cells());
    if let Some(cell) = (0..left_cells.len()).find(|&i| left_cells[i] != right_cells[i]) {
        return Some(format!(
            "cell {} differs: raw {} vs optimized {}",
            cell, left_cells[cell], right_cells[cell]
        ));
    }
    if left.output() != right.output() {
        return Some("output differs".to_string());
    }
    None
}

//! # Tape virtual machine
//!
//! Executes a [`Program`](crate::bytecode::Program) against a fixed-size tape
//! of signed 32-bit cells.
//!
//! ```text
//! vm/
//! ├── tape.rs      # Tape with checked cell access
//! ├── io.rs        # Input sources and output sinks
//! ├── executor.rs  # Executor (fetch/dispatch loop)
//! └── lockstep.rs  # Raw vs optimized validation
//! ```

mod executor;
mod io;
pub mod lockstep;
mod tape;

pub use executor::{ExecutionResult, Executor, StepEvent};
pub use io::{OutputSink, StdinInput, StdoutSink};
pub use lockstep::{validate, ValidationReport};
pub use tape::Tape;

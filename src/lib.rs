//! # Tapevm - An Optimizing Tape Machine
//!
//! Compiles programs written in the eight-symbol tape language
//! (`+ - < > [ ] , .`) into a compact bytecode, rewrites linear loops into
//! closed-form multiply-accumulate blocks, and runs the result on a
//! fixed-size tape of signed 32-bit cells.
//!
//! ## Quick Start
//!
//! ```rust
//! use tapevm::compile_and_run;
//!
//! # fn main() -> tapevm::Result<()> {
//! // 8 * 8 + 1 = 65 = 'A'
//! let output = compile_and_run(b"++++++++[>++++++++<-]>+.", b"")?;
//! assert_eq!(output, b"A");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source → Assembler → Program ─┬──────────────────────→ Executor
//!                               └→ Optimizer → Program ─┘
//! ```
//!
//! - [`Assembler`] - coalesces runs and resolves loop jumps
//! - [`Optimizer`] - rewrites linear loops in place, never changing program length
//! - [`Executor`] - runs a [`Program`] against a [`Tape`]
//! - [`vm::validate`] - runs raw and optimized programs in lockstep
//!
//! ### Step by step
//!
//! ```rust
//! use tapevm::{assemble, optimize, Executor, VmConfig};
//!
//! # fn main() -> tapevm::Result<()> {
//! let raw = assemble(b"++++[->+<]")?;
//! let optimized = optimize(raw.clone());
//! assert_eq!(raw.len(), optimized.program.len());
//! assert_eq!(optimized.rewritten_loops, 1);
//!
//! let config = VmConfig::default();
//! let result = Executor::new(&optimized.program, &config, std::iter::empty(), Vec::new()).run()?;
//! assert_eq!(&result.tape[..2], &[0, 4]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Unbalanced brackets fail before anything runs:
//!
//! ```rust
//! use tapevm::{assemble, Error};
//!
//! assert_eq!(assemble(b"]").unwrap_err(), Error::UnmatchedClose { position: 0 });
//! ```

pub mod assembler;
pub mod bytecode;
pub mod config;
pub mod debug;
pub mod error;
pub mod optimizer;
pub mod vm;

/// Version of the tapevm crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types
pub use assembler::{assemble, Assembler};
pub use bytecode::{Instruction, JumpCondition, Program};
pub use config::{EofPolicy, VmConfig};
pub use error::{Error, ErrorSeverity, Result};
pub use optimizer::{optimize, OptimizeWarning, Optimized, Optimizer};
pub use vm::{ExecutionResult, Executor, OutputSink, Tape, ValidationReport};

/// Raw and optimized forms of one source program
#[derive(Debug, Clone)]
pub struct Compiled {
    /// Program as assembled
    pub raw: Program,
    /// Program after the linear loop pass (equal to `raw` when disabled)
    pub optimized: Program,
    /// Optimizer diagnostics
    pub warnings: Vec<OptimizeWarning>,
    /// Number of loops rewritten
    pub rewritten_loops: usize,
}

impl Compiled {
    /// Program the executor should run
    pub fn program(&self) -> &Program {
        &self.optimized
    }
}

/// Compile-and-run pipeline with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: VmConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: VmConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Assemble and, if enabled, optimize a source program
    pub fn compile(&self, source: &[u8]) -> Result<Compiled> {
        let raw = assemble(source)?;
        if !self.config.optimize {
            return Ok(Compiled {
                optimized: raw.clone(),
                raw,
                warnings: Vec::new(),
                rewritten_loops: 0,
            });
        }

        let Optimized {
            program,
            warnings,
            rewritten_loops,
        } = optimize(raw.clone());
        Ok(Compiled {
            raw,
            optimized: program,
            warnings,
            rewritten_loops,
        })
    }

    /// Run a compiled program with any input and output
    pub fn run_with<I, O>(&self, compiled: &Compiled, input: I, output: O) -> Result<ExecutionResult<O>>
    where
        I: Iterator<Item = u8>,
        O: OutputSink,
    {
        self.config.validate()?;
        Executor::new(compiled.program(), &self.config, input, output).run()
    }

    /// Run a compiled program over in-memory input, collecting output
    pub fn run(&self, compiled: &Compiled, input: &[u8]) -> Result<ExecutionResult> {
        self.run_with(compiled, input.iter().copied(), Vec::new())
    }

    /// Run raw and optimized programs in lockstep
    pub fn validate(&self, compiled: &Compiled, input: &[u8]) -> Result<ValidationReport> {
        self.config.validate()?;
        vm::validate(&compiled.raw, &compiled.optimized, &self.config, input)
    }
}

/// Assemble, optimize and run a program with the default configuration
pub fn compile_and_run(source: &[u8], input: &[u8]) -> Result<Vec<u8>> {
    let pipeline = Pipeline::default();
    let compiled = pipeline.compile(source)?;
    Ok(pipeline.run(&compiled, input)?.output)
}

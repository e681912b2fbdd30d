//! Command-line interface for tapevm.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tapevm::debug::{dump_program, side_by_side};
use tapevm::vm::{StdinInput, StdoutSink};
use tapevm::{Compiled, Pipeline, VmConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tapevm", version)]
#[command(about = "Optimizing bytecode interpreter for the eight-symbol tape language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program, reading stdin and writing stdout
    Run {
        /// Program file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        vm: VmArgs,

        /// Print elapsed time to stderr
        #[arg(long)]
        time: bool,
    },

    /// Run the raw and optimized programs in lockstep and compare them
    Validate {
        /// Program file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// File used as program input (empty input if omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        #[command(flatten)]
        vm: VmArgs,
    },

    /// Print the bytecode listing
    Dump {
        /// Program file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Show raw and optimized bytecode side by side
        #[arg(long)]
        compare: bool,

        /// Skip the optimizer
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args)]
struct VmArgs {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of tape cells
    #[arg(long)]
    tape_size: Option<usize>,

    /// Starting cell of the pointer
    #[arg(long)]
    start_pointer: Option<usize>,

    /// Abort after this many executed instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Skip the linear loop optimizer
    #[arg(long)]
    no_optimize: bool,
}

impl VmArgs {
    fn into_config(self) -> Result<VmConfig> {
        let mut config = match &self.config {
            Some(path) => VmConfig::load(path)?,
            None => VmConfig::default(),
        };
        if let Some(tape_size) = self.tape_size {
            config.tape_size = tape_size;
        }
        if let Some(start_pointer) = self.start_pointer {
            config.start_pointer = start_pointer;
        }
        if self.max_steps.is_some() {
            config.max_steps = self.max_steps;
        }
        if self.no_optimize {
            config.optimize = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run { file, vm, time } => cmd_run(&file, vm, time),
        Commands::Validate { file, input, vm } => cmd_validate(&file, input.as_deref(), vm),
        Commands::Dump { file, compare, raw } => cmd_dump(&file, compare, raw),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn compile(file: &Path, pipeline: &Pipeline) -> Result<Compiled> {
    let source = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    // Optimizer warnings are reported through tracing
    let compiled = pipeline.compile(&source)?;
    Ok(compiled)
}

fn cmd_run(file: &Path, vm: VmArgs, time: bool) -> Result<()> {
    let pipeline = Pipeline::new(vm.into_config()?);
    let compiled = compile(file, &pipeline)?;

    let start = Instant::now();
    let result = pipeline.run_with(&compiled, StdinInput::new(), StdoutSink::new())?;
    if time {
        eprintln!(
            "{} ms ({} steps)",
            start.elapsed().as_millis(),
            result.steps
        );
    }
    Ok(())
}

fn cmd_validate(file: &Path, input: Option<&Path>, vm: VmArgs) -> Result<()> {
    let mut config = vm.into_config()?;
    config.optimize = true;
    let pipeline = Pipeline::new(config);
    let compiled = compile(file, &pipeline)?;
    let input = match input {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => Vec::new(),
    };

    let start = Instant::now();
    let report = pipeline.validate(&compiled, &input)?;
    println!(
        "ok: {} checkpoints, {} loops rewritten, {} raw steps, {} optimized steps, {} ms",
        report.checkpoints,
        compiled.rewritten_loops,
        report.raw_steps,
        report.optimized_steps,
        start.elapsed().as_millis()
    );
    Ok(())
}

fn cmd_dump(file: &Path, compare: bool, raw: bool) -> Result<()> {
    let config = VmConfig {
        optimize: !raw,
        ..VmConfig::default()
    };
    let compiled = compile(file, &Pipeline::new(config))?;
    if compare {
        print!("{}", side_by_side(&compiled.raw, &compiled.optimized));
    } else {
        dump_program(compiled.program());
    }
    Ok(())
}

//! Runtime orchestration
//!
//! The [`Runtime`] turns a [`RuntimeConfig`] into one executor, drives it
//! through `prepare` and `execute`, and times each phase.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use bytecode_system::{compile, CompileOptions};
use core_types::RawProgram;
use tracing::{info, warn};

use crate::cli::{Cli, Strategy};
use crate::error::CliResult;
use crate::loader::load_program;

/// Settings for one run, usually built from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Execution strategy
    pub strategy: Strategy,
    /// Print the run report to stderr
    pub verbose: bool,
    /// Profile bytecode execution
    pub trace: bool,
    /// Odd-step guard for zeroing loops
    pub strict_zeroing: bool,
    /// Print the op stream instead of running
    pub dump_ops: bool,
}

impl RuntimeConfig {
    /// Default settings for `strategy`
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            verbose: false,
            trace: false,
            strict_zeroing: false,
            dump_ops: false,
        }
    }

    /// Enable the run report
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Enable the bytecode profile
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Enable the odd-step guard
    pub fn with_strict_zeroing(mut self, enabled: bool) -> Self {
        self.strict_zeroing = enabled;
        self
    }

    /// Print the op stream instead of running
    pub fn with_dump_ops(mut self, enabled: bool) -> Self {
        self.dump_ops = enabled;
        self
    }

    /// Compile options for the configured strategy
    pub fn compile_options(&self) -> CompileOptions {
        self.strategy
            .compile_options(CompileOptions::default().with_strict_zeroing(self.strict_zeroing))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(Strategy::Optimized)
    }
}

impl From<&Cli> for RuntimeConfig {
    fn from(cli: &Cli) -> Self {
        Self::new(cli.strategy)
            .with_verbose(cli.verbose)
            .with_trace(cli.trace)
            .with_strict_zeroing(cli.strict_zeroing)
            .with_dump_ops(cli.dump_ops)
    }
}

/// Sizes and timings of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Name of the executor that ran
    pub strategy: &'static str,
    /// Instructions after filtering
    pub program_len: usize,
    /// Time spent reading and filtering the file
    pub load_time: Duration,
    /// Time spent in `prepare`
    pub prepare_time: Duration,
    /// Time spent in `execute`
    pub run_time: Duration,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "strategy:      {}", self.strategy)?;
        writeln!(f, "program size:  {}", self.program_len)?;
        writeln!(f, "load time:     {:.6}s", self.load_time.as_secs_f64())?;
        writeln!(f, "prepare time:  {:.6}s", self.prepare_time.as_secs_f64())?;
        write!(f, "run time:      {:.6}s", self.run_time.as_secs_f64())
    }
}

/// Runs programs with one configured strategy
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime
    ///
    /// # Example
    /// ```
    /// use bf_cli::{Runtime, RuntimeConfig, Strategy};
    ///
    /// let runtime = Runtime::new(RuntimeConfig::new(Strategy::JumpTable).with_verbose(true));
    /// assert!(runtime.config().verbose);
    /// ```
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Load `path` and run it, or dump its op stream to stdout
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or the program fails
    ///
    /// # Example
    /// ```no_run
    /// use bf_cli::Runtime;
    ///
    /// let report = Runtime::default().execute_file("hello.b").unwrap();
    /// println!("{}", report);
    /// ```
    pub fn execute_file(&self, path: impl AsRef<Path>) -> CliResult<RunReport> {
        let started = Instant::now();
        let program = load_program(path)?;
        let load_time = started.elapsed();

        if self.config.verbose {
            eprintln!("program: {}", program.as_str());
        }

        if self.config.dump_ops {
            let stdout = std::io::stdout();
            self.dump_ops(&program, &mut stdout.lock())?;
            return Ok(RunReport {
                strategy: "dump-ops",
                program_len: program.len(),
                load_time,
                ..RunReport::default()
            });
        }

        let mut report = self.run_program(&program)?;
        report.load_time = load_time;
        if self.config.verbose {
            eprintln!("{}", report);
        }
        Ok(report)
    }

    /// Prepare and execute `program` on the standard streams
    pub fn run_program(&self, program: &RawProgram) -> CliResult<RunReport> {
        if self.config.trace && !self.config.strategy.is_bytecode() {
            warn!(
                strategy = ?self.config.strategy,
                "--trace only applies to the bytecode strategies; ignoring"
            );
        }

        let mut executor = self
            .config
            .strategy
            .executor(self.config.compile_options(), self.config.trace);
        info!(strategy = executor.name(), "selected strategy");

        let started = Instant::now();
        executor.prepare(program)?;
        let prepare_time = started.elapsed();
        info!(elapsed = ?prepare_time, "prepared program");

        let started = Instant::now();
        executor.execute(program)?;
        let run_time = started.elapsed();
        info!(elapsed = ?run_time, "finished program");

        Ok(RunReport {
            strategy: executor.name(),
            program_len: program.len(),
            load_time: Duration::ZERO,
            prepare_time,
            run_time,
        })
    }

    /// Write the op stream for `program` to `out`, one op per line
    pub fn dump_ops<W: Write + ?Sized>(&self, program: &RawProgram, out: &mut W) -> CliResult<()> {
        let stream = compile(program, &self.config.compile_options())?;
        write!(out, "{}", stream)?;
        let stats = stream.stats();
        writeln!(
            out,
            "; {} ops, {} loops specialized, {} plain",
            stream.len(),
            stats.specialized(),
            stats.plain_loops
        )?;
        Ok(())
    }
}

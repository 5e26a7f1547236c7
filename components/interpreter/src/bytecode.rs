//! Op-stream executor
//!
//! Runs a compiled [`OpStream`] on a [`MemoryTape`]. Jumps use the absolute
//! convention: the target is the partner's index, and the program counter
//! advances past it after the jump.

use std::io::{Read, Write};

use bytecode_system::{compile, CompileOptions, Op, OpStream};
use core_types::{BfError, BfResult, Executor, RawProgram};
use tracing::debug;

use crate::profile::ExecutionProfile;
use crate::stdio::with_std_streams;
use crate::tape::MemoryTape;

/// Executes an op stream, optionally profiling it
#[derive(Debug, Clone, Default)]
pub struct BytecodeExecutor {
    profile: Option<ExecutionProfile>,
}

impl BytecodeExecutor {
    /// Create an executor without profiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor that profiles every op it runs
    pub fn with_profile() -> Self {
        Self {
            profile: Some(ExecutionProfile::new()),
        }
    }

    /// Profile collected so far, if profiling is enabled
    pub fn profile(&self) -> Option<&ExecutionProfile> {
        self.profile.as_ref()
    }

    /// Run `stream` on `tape`
    ///
    /// # Example
    ///
    /// ```
    /// use bytecode_system::{compile, CompileOptions};
    /// use core_types::RawProgram;
    /// use interpreter::{BytecodeExecutor, MemoryTape};
    ///
    /// let program = RawProgram::from_source("+++++[-]");
    /// let stream = compile(&program, &CompileOptions::default()).unwrap();
    /// let mut tape = MemoryTape::new();
    /// BytecodeExecutor::new()
    ///     .run(&stream, &mut tape, &mut std::io::empty(), &mut std::io::sink())
    ///     .unwrap();
    /// assert_eq!(tape.current(), 0);
    /// ```
    pub fn run<R, W>(
        &mut self,
        stream: &OpStream,
        tape: &mut MemoryTape,
        input: &mut R,
        output: &mut W,
    ) -> BfResult<()>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let ops = stream.ops();
        let mut pc = 0;

        while pc < ops.len() {
            let op = ops[pc];
            if let Some(profile) = self.profile.as_mut() {
                profile.record(&op);
            }

            match op {
                Op::MovePtrForward(n) => tape.move_by(n as i64)?,
                Op::MovePtrBackward(n) => tape.move_by(-(n as i64))?,
                // Truncation to u8 is the reduction modulo 256.
                Op::AddData(n) => tape.add(n as u8),
                Op::SubData(n) => tape.sub(n as u8),
                Op::Write(n) => {
                    for _ in 0..n {
                        tape.write_current(output)?;
                    }
                }
                Op::Read(n) => {
                    for _ in 0..n {
                        tape.read_current(input)?;
                    }
                }
                Op::JumpIfZero(target) => {
                    if tape.current() == 0 {
                        pc = jump_target(ops.len(), pc, target)?;
                    }
                }
                Op::JumpIfNotZero(target) => {
                    if tape.current() != 0 {
                        pc = jump_target(ops.len(), pc, target)?;
                    }
                }
                Op::SetZero => tape.set_current(0),
                Op::ScanUntilZero(step) => tape.scan_until_zero(step as i64)?,
                Op::TransferAndZero(delta) => tape.transfer_and_zero(delta as i64)?,
            }
            pc += 1;
        }
        Ok(())
    }
}

fn jump_target(len: usize, pc: usize, target: usize) -> BfResult<usize> {
    if target >= len {
        return Err(BfError::internal(format!(
            "jump at {} targets {} outside a stream of {} ops",
            pc, target, len
        )));
    }
    Ok(target)
}

/// `Executor` that compiles to an op stream and runs it
#[derive(Debug, Clone)]
pub struct BytecodeInterpreter {
    options: CompileOptions,
    trace: bool,
    stream: Option<OpStream>,
    profile: Option<ExecutionProfile>,
}

impl BytecodeInterpreter {
    /// Create an interpreter compiling with `options`
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            trace: false,
            stream: None,
            profile: None,
        }
    }

    /// Fusion and loop specialization
    pub fn optimized() -> Self {
        Self::new(CompileOptions::default())
    }

    /// Fusion only; every loop stays a jump pair
    pub fn unspecialized() -> Self {
        Self::new(CompileOptions::unspecialized())
    }

    /// Profile execution and print the report to stderr afterwards
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Compile options in use
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Stream compiled by the last `prepare`, if any
    pub fn stream(&self) -> Option<&OpStream> {
        self.stream.as_ref()
    }

    /// Profile of the last traced run
    pub fn profile(&self) -> Option<&ExecutionProfile> {
        self.profile.as_ref()
    }
}

impl Default for BytecodeInterpreter {
    fn default() -> Self {
        Self::optimized()
    }
}

impl Executor for BytecodeInterpreter {
    fn name(&self) -> &'static str {
        if self.options.specialize_loops {
            "optimized"
        } else {
            "bytecode"
        }
    }

    fn prepare(&mut self, program: &RawProgram) -> BfResult<()> {
        let stream = compile(program, &self.options)?;
        debug!(
            ops = stream.len(),
            specialized = stream.stats().specialized(),
            "prepared op stream"
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn execute(&mut self, program: &RawProgram) -> BfResult<()> {
        if self.stream.is_none() {
            self.prepare(program)?;
        }
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| BfError::internal("op stream missing after prepare"))?;

        let mut executor = if self.trace {
            BytecodeExecutor::with_profile()
        } else {
            BytecodeExecutor::new()
        };
        let mut tape = MemoryTape::new();
        let result =
            with_std_streams(|input, output| executor.run(stream, &mut tape, input, output));

        if let Some(profile) = executor.profile {
            eprint!("{}", profile);
            self.profile = Some(profile);
        }
        result
    }
}

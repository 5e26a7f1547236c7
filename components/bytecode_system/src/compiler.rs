//! Op-stream compiler
//!
//! Lowers a raw program to an [`OpStream`] in one left-to-right pass:
//! runs of identical non-bracket characters are fused into one op carrying
//! the run length, brackets are matched with an explicit stack of stream
//! positions, and each loop is handed to the [`LoopSpecializer`] when its
//! closing bracket is reached.

use core_types::{BfError, BfResult, RawProgram};
use tracing::debug;

use crate::opcode::{Op, OpKind};
use crate::specializer::{LoopSpecializer, SpecializationStats, SpecializeOptions};
use crate::stream::OpStream;

/// Options for [`compile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Replace recognized loop idioms with specialized ops
    pub specialize_loops: bool,
    /// Options forwarded to the loop specializer
    pub specialize: SpecializeOptions,
}

impl CompileOptions {
    /// Fusion and jump resolution only; every loop stays a jump pair
    pub fn unspecialized() -> Self {
        Self {
            specialize_loops: false,
            specialize: SpecializeOptions::default(),
        }
    }

    /// Require an odd step before replacing a zeroing loop
    pub fn with_strict_zeroing(mut self, strict: bool) -> Self {
        self.specialize.strict_zeroing = strict;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            specialize_loops: true,
            specialize: SpecializeOptions::default(),
        }
    }
}

/// An open `[` waiting for its `]`
#[derive(Debug, Clone, Copy)]
struct OpenLoop {
    /// Index of the `JUMP_IF_ZERO` in the stream
    stream_index: usize,
    /// Index of the `[` in the raw program
    source_position: usize,
}

/// Single-pass compiler from [`RawProgram`] to [`OpStream`]
#[derive(Debug)]
pub struct OpStreamCompiler {
    options: CompileOptions,
    specializer: LoopSpecializer,
    ops: Vec<Op>,
    source_positions: Vec<usize>,
    open_loops: Vec<OpenLoop>,
    stats: SpecializationStats,
}

impl OpStreamCompiler {
    /// Create a compiler with the given options
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            specializer: LoopSpecializer::with_options(options.specialize),
            ops: Vec::new(),
            source_positions: Vec::new(),
            open_loops: Vec::new(),
            stats: SpecializationStats::default(),
        }
    }

    /// Compile `program`, consuming the compiler
    pub fn compile(mut self, program: &RawProgram) -> BfResult<OpStream> {
        let instructions = program.as_bytes();
        let mut pc = 0;

        while pc < instructions.len() {
            let insn = instructions[pc];
            match insn {
                b'[' => {
                    self.open_loops.push(OpenLoop {
                        stream_index: self.ops.len(),
                        source_position: pc,
                    });
                    self.push(Op::JumpIfZero(0), pc);
                    pc += 1;
                }
                b']' => {
                    let open = self
                        .open_loops
                        .pop()
                        .ok_or_else(|| BfError::unmatched_bracket(b']', pc))?;
                    self.close_loop(open.stream_index, pc);
                    pc += 1;
                }
                _ => {
                    let op = OpKind::from_fusible(insn)
                        .and_then(|kind| {
                            let run = instructions[pc..]
                                .iter()
                                .take_while(|b| **b == insn)
                                .count();
                            kind.with_count(run)
                        })
                        .ok_or_else(|| {
                            BfError::internal(format!(
                                "character {:?} at {} is not an opcode",
                                insn as char, pc
                            ))
                        })?;
                    self.push(op, pc);
                    pc += op.argument() as usize;
                }
            }
        }

        // The earliest unclosed `[` is the one a forward bracket scan fails on.
        if let Some(open) = self.open_loops.first() {
            return Err(BfError::unmatched_bracket(b'[', open.source_position));
        }

        debug!(
            source_len = instructions.len(),
            ops = self.ops.len(),
            set_zero = self.stats.set_zero,
            scan_until_zero = self.stats.scan_until_zero,
            transfer_and_zero = self.stats.transfer_and_zero,
            plain_loops = self.stats.plain_loops,
            "compiled op stream"
        );

        Ok(OpStream::from_parts(
            self.ops,
            self.source_positions,
            self.stats,
        ))
    }

    fn push(&mut self, op: Op, source_position: usize) {
        self.ops.push(op);
        self.source_positions.push(source_position);
    }

    /// Close the loop opened at `open`; its body is `ops[open + 1..]`
    fn close_loop(&mut self, open: usize, source_position: usize) {
        if self.options.specialize_loops {
            if let Some(op) = self.specializer.specialize(&self.ops[open + 1..]) {
                let open_position = self.source_positions[open];
                self.ops.truncate(open);
                self.source_positions.truncate(open);
                self.push(op, open_position);
                self.stats.record(&op);
                return;
            }
        }

        let close = self.ops.len();
        self.ops[open] = Op::JumpIfZero(close);
        self.push(Op::JumpIfNotZero(open), source_position);
        self.stats.plain_loops += 1;
    }
}

/// Compile `program` into an op stream.
///
/// # Example
///
/// ```
/// use bytecode_system::{compile, CompileOptions, Op};
/// use core_types::RawProgram;
///
/// let program = RawProgram::from_source("+++++[-]>>,");
/// let stream = compile(&program, &CompileOptions::default()).unwrap();
/// assert_eq!(
///     stream.ops(),
///     &[Op::AddData(5), Op::SetZero, Op::MovePtrForward(2), Op::Read(1)]
/// );
/// ```
pub fn compile(program: &RawProgram, options: &CompileOptions) -> BfResult<OpStream> {
    OpStreamCompiler::new(*options).compile(program)
}

/// Compile `program` with fusion and jump resolution only
pub fn compile_unspecialized(program: &RawProgram) -> BfResult<OpStream> {
    compile(program, &CompileOptions::unspecialized())
}

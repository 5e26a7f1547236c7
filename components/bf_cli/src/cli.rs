//! Command-line arguments

use std::path::PathBuf;

use bytecode_system::CompileOptions;
use clap::{Parser, ValueEnum};
use core_types::Executor;
use interpreter::{BytecodeInterpreter, JumpTableInterpreter, SimpleInterpreter};
use jit_compiler::{CraneliftJit, TemplateJit};

/// Execution strategy, chosen once at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Walk the raw program, scanning for loop partners at run time
    Simple,
    /// Walk the raw program with a precomputed bracket table
    JumpTable,
    /// Run-length fused op stream without loop specialization
    Bytecode,
    /// Fused op stream with loop specialization
    Optimized,
    /// Hand-encoded x86-64 templates
    TemplateJit,
    /// Cranelift-generated native code
    CraneliftJit,
}

impl Strategy {
    /// Whether this strategy runs the op stream in the bytecode executor
    pub fn is_bytecode(self) -> bool {
        matches!(self, Strategy::Bytecode | Strategy::Optimized)
    }

    /// Compile options this strategy uses, given the base `options`
    pub fn compile_options(self, options: CompileOptions) -> CompileOptions {
        match self {
            Strategy::Bytecode => CompileOptions {
                specialize_loops: false,
                ..options
            },
            _ => options,
        }
    }

    /// Build the executor for this strategy
    pub fn executor(self, options: CompileOptions, trace: bool) -> Box<dyn Executor> {
        let options = self.compile_options(options);
        match self {
            Strategy::Simple => Box::new(SimpleInterpreter::new()),
            Strategy::JumpTable => Box::new(JumpTableInterpreter::new()),
            Strategy::Bytecode | Strategy::Optimized => {
                Box::new(BytecodeInterpreter::new(options).with_trace(trace))
            }
            Strategy::TemplateJit => Box::new(TemplateJit::new(options)),
            Strategy::CraneliftJit => Box::new(CraneliftJit::new(options)),
        }
    }
}

/// Corten BF - optimizing interpreter and JIT for the eight-opcode tape language
#[derive(Parser, Debug, Clone)]
#[command(name = "corten-bf", version, about)]
pub struct Cli {
    /// Program file; characters other than `><+-.,[]` are ignored
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Execution strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Optimized)]
    pub strategy: Strategy,

    /// Report program size and timings on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Print an op profile to stderr after a bytecode run
    #[arg(long)]
    pub trace: bool,

    /// Only replace `[+n]`/`[-n]` with a clear when `n` is odd
    #[arg(long)]
    pub strict_zeroing: bool,

    /// Print the compiled op stream instead of running the program
    #[arg(long)]
    pub dump_ops: bool,
}

impl Cli {
    /// Arguments for running `file` with all defaults
    pub fn with_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            strategy: Strategy::Optimized,
            verbose: false,
            trace: false,
            strict_zeroing: false,
            dump_ops: false,
        }
    }
}

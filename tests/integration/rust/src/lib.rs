//! Integration test suite for Corten BF
//!
//! This crate provides shared programs and helpers for tests that verify
//! components work together correctly across component boundaries.

use bytecode_system::{compile, CompileOptions};
use core_types::{BfResult, RawProgram};
use interpreter::{BytecodeExecutor, JumpTableInterpreter, MemoryTape, SimpleInterpreter};

/// Re-export components for test convenience
pub mod components {
    pub use bf_cli;
    pub use bytecode_system;
    pub use core_types;
    pub use interpreter;
    pub use jit_compiler;
}

/// Programs shared by the suites
pub mod programs {
    /// Prints `Hello World!\n`
    pub const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

    /// Copies input to output until EOF
    pub const CAT: &str = ",[.[-],]";

    /// Reverses its input (terminated by EOF)
    pub const REVERSE: &str = ">,[>,]<[.<]";

    /// Prints the ten decimal digits
    pub const DIGITS: &str = "++++++++[>++++++<-]>>++++++++++[<.+>-]";

    /// Moves left off the tape after printing `A`
    pub const FALLS_OFF_LEFT: &str = "++++++++[>++++++++<-]>+.<<";

    /// Every program that terminates normally, with the input it expects
    pub const TERMINATING: &[(&str, &str, &[u8])] = &[
        ("hello_world", HELLO_WORLD, b""),
        ("cat", CAT, b"the quick brown fox"),
        ("reverse", REVERSE, b"stressed"),
        ("digits", DIGITS, b""),
        ("clear_and_move", "+++++[-]>+++[->>+<<]>>[<]", b""),
        ("wrapping", "-.+.", b""),
        ("eof_keeps_cell", "+++,.", b""),
    ];
}

/// What a run produced
#[derive(Debug)]
pub struct Outcome {
    /// Bytes written to the output stream
    pub output: Vec<u8>,
    /// Final tape, including the data pointer
    pub tape: MemoryTape,
    /// Whether the run ended in an error
    pub result: BfResult<()>,
}

/// Run `source` with the naive scanning interpreter
pub fn run_simple(source: &str, input: &[u8]) -> Outcome {
    let program = RawProgram::from_source(source);
    let mut tape = MemoryTape::new();
    let mut output = Vec::new();
    let result = SimpleInterpreter::new().run(&program, &mut tape, &mut &input[..], &mut output);
    Outcome {
        output,
        tape,
        result,
    }
}

/// Run `source` with the jump-table interpreter
pub fn run_jump_table(source: &str, input: &[u8]) -> Outcome {
    let program = RawProgram::from_source(source);
    let mut tape = MemoryTape::new();
    let mut output = Vec::new();
    let result =
        JumpTableInterpreter::new().run(&program, &mut tape, &mut &input[..], &mut output);
    Outcome {
        output,
        tape,
        result,
    }
}

/// Compile `source` with `options` and run it in the bytecode executor
pub fn run_bytecode(source: &str, input: &[u8], options: &CompileOptions) -> Outcome {
    let program = RawProgram::from_source(source);
    let mut tape = MemoryTape::new();
    let mut output = Vec::new();
    let result = compile(&program, options).and_then(|stream| {
        BytecodeExecutor::new().run(&stream, &mut tape, &mut &input[..], &mut output)
    });
    Outcome {
        output,
        tape,
        result,
    }
}

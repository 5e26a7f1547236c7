//! Interpreters for the eight-opcode tape language
//!
//! This crate provides three interpreter tiers over a shared [`MemoryTape`]:
//! - [`SimpleInterpreter`]: walks the raw program and scans for loop
//!   partners at run time
//! - [`JumpTableInterpreter`]: walks the raw program with bracket targets
//!   resolved up front
//! - [`BytecodeInterpreter`]: compiles to an op stream (optionally with loop
//!   specialization) and runs it with the [`BytecodeExecutor`]
//!
//! All of them implement [`core_types::Executor`] on the process's standard
//! streams, and expose a `run` method generic over `Read`/`Write` for
//! embedding and tests.
//!
//! # Example
//!
//! ```
//! use core_types::RawProgram;
//! use interpreter::{JumpTableInterpreter, MemoryTape};
//!
//! let program = RawProgram::from_source(",[.[-],]");
//! let mut tape = MemoryTape::new();
//! let mut output = Vec::new();
//! JumpTableInterpreter::new()
//!     .run(&program, &mut tape, &mut &b"echo"[..], &mut output)
//!     .unwrap();
//! assert_eq!(output, b"echo");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bytecode;
pub mod jump_table_interp;
pub mod profile;
pub mod simple;
mod stdio;
pub mod tape;

// Re-export main types at crate root
pub use bytecode::{BytecodeExecutor, BytecodeInterpreter};
pub use jump_table_interp::JumpTableInterpreter;
pub use profile::ExecutionProfile;
pub use simple::SimpleInterpreter;
pub use tape::MemoryTape;

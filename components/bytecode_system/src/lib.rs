//! Op stream system for the Corten BF toolchain
//!
//! This crate turns a raw program into the optimized intermediate stream
//! consumed by the bytecode executor and both native code generators.
//!
//! # Features
//!
//! - Bracket matching over the raw program (jump tables for the simple tiers)
//! - Run-length fusion of repeated `> < + - . ,`
//! - Absolute jump targets resolved with an explicit bracket stack
//! - Loop idiom specialization (`SET_ZERO`, `SCAN_UNTIL_ZERO`, `TRANSFER_AND_ZERO`)
//!
//! # Example
//!
//! ```
//! use bytecode_system::{compile, CompileOptions, Op};
//! use core_types::RawProgram;
//!
//! let program = RawProgram::from_source("++[->+<]");
//! let stream = compile(&program, &CompileOptions::default()).unwrap();
//!
//! assert_eq!(stream.ops(), &[Op::AddData(2), Op::TransferAndZero(1)]);
//! assert_eq!(stream.stats().transfer_and_zero, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod jump_table;
pub mod opcode;
pub mod specializer;
pub mod stream;

// Re-export main types at crate root
pub use compiler::{compile, compile_unspecialized, CompileOptions, OpStreamCompiler};
pub use jump_table::{find_matching_close, find_matching_open, resolve_jumps, JumpTable};
pub use opcode::{Op, OpKind};
pub use specializer::{LoopSpecializer, SpecializationStats, SpecializeOptions};
pub use stream::OpStream;

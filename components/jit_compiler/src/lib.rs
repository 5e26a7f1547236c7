//! Native code generation for the eight-opcode tape language
//!
//! This crate provides two backends that turn a compiled op stream into a
//! single native function `extern "C" fn(tape: *mut u8) -> u64`:
//! - Template JIT: hand-encoded x86-64 byte templates with manual
//!   rel32 branch fixups
//! - Cranelift JIT: Cranelift IR lowered for the host ISA
//!
//! Generated code is copied into an [`exec_memory`] region that is made
//! executable only after it has been written, run once against the tape, and
//! unmapped. The function returns the final data index; an index outside
//! the tape means the program moved the pointer off it.
//!
//! # Example
//!
//! ```
//! use bytecode_system::{compile, CompileOptions};
//! use core_types::RawProgram;
//! use jit_compiler::{generate_template_code, IoFds};
//!
//! let program = RawProgram::from_source("+++[->+<]");
//! let stream = compile(&program, &CompileOptions::default()).unwrap();
//! let code = generate_template_code(&stream, IoFds::default()).unwrap();
//! assert!(code.starts_with(&jit_compiler::x86::PROLOGUE));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod code_buffer;
pub mod cranelift_backend;
pub mod exec_memory;
pub mod io;
pub mod native;
pub mod template_jit;
pub mod x86;

// Re-export main types at crate root
pub use code_buffer::{compute_rel32, CodeBuffer};
pub use cranelift_backend::{CraneliftCompiler, CraneliftJit};
pub use exec_memory::{EntryPoint, ExecutableRegion, WritableRegion};
pub use io::IoFds;
pub use native::run_native;
pub use template_jit::{
    generate_template_code, TemplateCompiler, TemplateJit, TEMPLATE_JIT_SUPPORTED,
};

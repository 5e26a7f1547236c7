//! Core types for the Corten BF toolchain.
//!
//! This crate provides the foundational types shared by every execution
//! strategy: the filtered source program, tape geometry, the error taxonomy
//! and the two-phase [`Executor`] capability.
//!
//! # Overview
//!
//! - [`RawProgram`] - Ordered sequence of opcode characters
//! - [`BfError`] - Fatal errors raised while compiling or running a program
//! - [`ErrorKind`] - Payload-free classification of a [`BfError`]
//! - [`Executor`] - Prepare-then-execute interface implemented by each tier
//!
//! # Examples
//!
//! ```
//! use core_types::{RawProgram, TAPE_SIZE};
//!
//! let program = RawProgram::from_source("++ comment >[-]");
//! assert_eq!(program.as_str(), "++>[-]");
//! assert_eq!(TAPE_SIZE, 30000);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod executor;
mod program;

pub use error::{BfError, BfResult, ErrorKind};
pub use executor::Executor;
pub use program::{is_opcode, RawProgram, OPCODE_CHARS, TAPE_SIZE};

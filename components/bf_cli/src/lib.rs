//! Command-line driver for the Corten BF toolchain
//!
//! Loads a program file, picks one execution strategy and runs the program
//! on the process's standard streams.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod loader;
pub mod runtime;

pub use cli::{Cli, Strategy};
pub use error::{CliError, CliResult};
pub use loader::load_program;
pub use runtime::{RunReport, Runtime, RuntimeConfig};

//! Error types for the CLI

use std::path::PathBuf;

use core_types::BfError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The program file could not be read
    #[error("could not read '{}': {source}", path.display())]
    Load {
        /// Path given on the command line
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Compiling or running the program failed
    #[error(transparent)]
    Bf(#[from] BfError),

    /// Writing diagnostics failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

//! Error types for compilation and execution.
//!
//! Every error in the toolchain is fatal: it is reported to the caller and
//! the run is aborted. There is no partial output and no retry.

use crate::TAPE_SIZE;
use thiserror::Error;

/// Classification of a [`BfError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A `[` or `]` without a structural partner
    UnmatchedBracket,
    /// The data pointer left `[0, TAPE_SIZE)`
    OutOfRangeTapeAccess,
    /// Native code could not be emitted or finalized
    CodeGenerationFailure,
    /// The executable region could not be mapped, protected or released
    MemoryArenaFailure,
    /// Reading or writing the program's streams failed
    Io,
    /// An op stream violated its own invariants
    InternalError,
}

/// A fatal error raised while compiling or running a program.
///
/// # Examples
///
/// ```
/// use core_types::{BfError, ErrorKind};
///
/// let error = BfError::unmatched_bracket(b']', 4);
/// assert_eq!(error.kind(), ErrorKind::UnmatchedBracket);
/// assert_eq!(error.to_string(), "unmatched ']' at position 4");
/// ```
#[derive(Debug, Error)]
pub enum BfError {
    /// A bracket has no partner; `position` is the bracket's source index
    #[error("unmatched '{bracket}' at position {position}")]
    UnmatchedBracket {
        /// The offending bracket character
        bracket: char,
        /// Index of the bracket in the raw program
        position: usize,
    },

    /// The data pointer moved outside the tape
    #[error("data pointer out of range: {pointer} (tape has {TAPE_SIZE} cells)")]
    OutOfRangeTapeAccess {
        /// Pointer value that would have been dereferenced
        pointer: i64,
    },

    /// The emitted instruction stream could not be finalized
    #[error("code generation failed: {0}")]
    CodeGenerationFailure(String),

    /// The executable memory region could not be managed
    #[error("executable memory failure: {0}")]
    MemoryArenaFailure(String),

    /// I/O on the program's input or output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken internal invariant (indicates a compiler bug)
    #[error("internal error: {0}")]
    InternalError(String),
}

impl BfError {
    /// Create an unmatched-bracket error
    pub fn unmatched_bracket(bracket: u8, position: usize) -> Self {
        BfError::UnmatchedBracket {
            bracket: bracket as char,
            position,
        }
    }

    /// Create an out-of-range tape access error
    pub fn out_of_range(pointer: i64) -> Self {
        BfError::OutOfRangeTapeAccess { pointer }
    }

    /// Create a code generation error
    pub fn codegen(message: impl Into<String>) -> Self {
        BfError::CodeGenerationFailure(message.into())
    }

    /// Create an executable memory error
    pub fn arena(message: impl Into<String>) -> Self {
        BfError::MemoryArenaFailure(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        BfError::InternalError(message.into())
    }

    /// The payload-free kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BfError::UnmatchedBracket { .. } => ErrorKind::UnmatchedBracket,
            BfError::OutOfRangeTapeAccess { .. } => ErrorKind::OutOfRangeTapeAccess,
            BfError::CodeGenerationFailure(_) => ErrorKind::CodeGenerationFailure,
            BfError::MemoryArenaFailure(_) => ErrorKind::MemoryArenaFailure,
            BfError::Io(_) => ErrorKind::Io,
            BfError::InternalError(_) => ErrorKind::InternalError,
        }
    }
}

/// Result type used across the toolchain
pub type BfResult<T> = Result<T, BfError>;

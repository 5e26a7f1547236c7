//! Source program representation and tape geometry.

use std::fmt;

/// Number of cells on the memory tape.
pub const TAPE_SIZE: usize = 30000;

/// The eight characters that make up the instruction alphabet.
pub const OPCODE_CHARS: [u8; 8] = *b"><+-.,[]";

/// Returns true if `byte` is one of the eight opcode characters.
#[inline]
pub fn is_opcode(byte: u8) -> bool {
    OPCODE_CHARS.contains(&byte)
}

/// An ordered sequence of opcode characters.
///
/// Everything outside the alphabet is dropped on construction, so the rest
/// of the pipeline never has to validate characters again.
///
/// # Examples
///
/// ```
/// use core_types::RawProgram;
///
/// let program = RawProgram::from_source("+[>.]\n# done");
/// assert_eq!(program.len(), 5);
/// assert_eq!(program.get(1), Some(b'['));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProgram {
    instructions: Vec<u8>,
}

impl RawProgram {
    /// Build a program from source text, keeping only opcode characters
    pub fn from_source(source: &str) -> Self {
        Self::from_bytes(source.as_bytes())
    }

    /// Build a program from raw bytes, keeping only opcode characters
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            instructions: bytes.iter().copied().filter(|b| is_opcode(*b)).collect(),
        }
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program has no instructions
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `index`, if any
    pub fn get(&self, index: usize) -> Option<u8> {
        self.instructions.get(index).copied()
    }

    /// All instructions as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.instructions
    }

    /// All instructions as text
    pub fn as_str(&self) -> &str {
        // Only ASCII opcode characters survive filtering.
        std::str::from_utf8(&self.instructions).unwrap_or_default()
    }
}

impl fmt::Display for RawProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Operations of the optimized intermediate stream.
//!
//! Run-length counts are stored unsigned; displacements of the specialized
//! loop ops are signed. Jump ops carry the absolute stream index of their
//! partner bracket.

use std::fmt;

/// A single operation in an [`OpStream`](crate::OpStream)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Move the data pointer right by the run length (`>`)
    MovePtrForward(usize),
    /// Move the data pointer left by the run length (`<`)
    MovePtrBackward(usize),
    /// Add the run length to the current cell, wrapping (`+`)
    AddData(usize),
    /// Subtract the run length from the current cell, wrapping (`-`)
    SubData(usize),
    /// Write the current cell to output, run length times (`.`)
    Write(usize),
    /// Read one byte into the current cell, run length times (`,`)
    Read(usize),
    /// Jump to the matching `JumpIfNotZero` if the cell is zero (`[`)
    JumpIfZero(usize),
    /// Jump back to the matching `JumpIfZero` if the cell is non-zero (`]`)
    JumpIfNotZero(usize),
    /// Set the current cell to zero (`[-]`, `[+]`)
    SetZero,
    /// Move the pointer by the displacement until the cell is zero (`[>]`, `[<<]`)
    ScanUntilZero(isize),
    /// Add the current cell to the cell at the displacement, then zero it (`[->+<]`)
    TransferAndZero(isize),
}

/// Payload-free kind of an [`Op`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    /// See [`Op::MovePtrForward`]
    MovePtrForward,
    /// See [`Op::MovePtrBackward`]
    MovePtrBackward,
    /// See [`Op::AddData`]
    AddData,
    /// See [`Op::SubData`]
    SubData,
    /// See [`Op::Write`]
    Write,
    /// See [`Op::Read`]
    Read,
    /// See [`Op::JumpIfZero`]
    JumpIfZero,
    /// See [`Op::JumpIfNotZero`]
    JumpIfNotZero,
    /// See [`Op::SetZero`]
    SetZero,
    /// See [`Op::ScanUntilZero`]
    ScanUntilZero,
    /// See [`Op::TransferAndZero`]
    TransferAndZero,
}

impl OpKind {
    /// Every kind, in declaration order
    pub const ALL: [OpKind; 11] = [
        OpKind::MovePtrForward,
        OpKind::MovePtrBackward,
        OpKind::AddData,
        OpKind::SubData,
        OpKind::Write,
        OpKind::Read,
        OpKind::JumpIfZero,
        OpKind::JumpIfNotZero,
        OpKind::SetZero,
        OpKind::ScanUntilZero,
        OpKind::TransferAndZero,
    ];

    /// Upper-case name used in dumps and traces
    pub fn name(self) -> &'static str {
        match self {
            OpKind::MovePtrForward => "MOVE_PTR_FORWARD",
            OpKind::MovePtrBackward => "MOVE_PTR_BACKWARD",
            OpKind::AddData => "ADD_DATA",
            OpKind::SubData => "SUB_DATA",
            OpKind::Write => "WRITE",
            OpKind::Read => "READ",
            OpKind::JumpIfZero => "JUMP_IF_ZERO",
            OpKind::JumpIfNotZero => "JUMP_IF_NOT_ZERO",
            OpKind::SetZero => "SET_ZERO",
            OpKind::ScanUntilZero => "SCAN_UNTIL_ZERO",
            OpKind::TransferAndZero => "TRANSFER_AND_ZERO",
        }
    }

    /// Source character for kinds that map to one, `?` otherwise
    pub fn symbol(self) -> char {
        match self {
            OpKind::MovePtrForward => '>',
            OpKind::MovePtrBackward => '<',
            OpKind::AddData => '+',
            OpKind::SubData => '-',
            OpKind::Write => '.',
            OpKind::Read => ',',
            OpKind::JumpIfZero => '[',
            OpKind::JumpIfNotZero => ']',
            _ => '?',
        }
    }

    /// Kind for a fusible source character
    pub fn from_fusible(byte: u8) -> Option<OpKind> {
        match byte {
            b'>' => Some(OpKind::MovePtrForward),
            b'<' => Some(OpKind::MovePtrBackward),
            b'+' => Some(OpKind::AddData),
            b'-' => Some(OpKind::SubData),
            b'.' => Some(OpKind::Write),
            b',' => Some(OpKind::Read),
            _ => None,
        }
    }

    /// Build a run-length op of this kind
    ///
    /// Returns `None` for jump and specialized kinds, which are never fused.
    pub fn with_count(self, count: usize) -> Option<Op> {
        match self {
            OpKind::MovePtrForward => Some(Op::MovePtrForward(count)),
            OpKind::MovePtrBackward => Some(Op::MovePtrBackward(count)),
            OpKind::AddData => Some(Op::AddData(count)),
            OpKind::SubData => Some(Op::SubData(count)),
            OpKind::Write => Some(Op::Write(count)),
            OpKind::Read => Some(Op::Read(count)),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Op {
    /// The payload-free kind of this op
    pub fn kind(&self) -> OpKind {
        match self {
            Op::MovePtrForward(_) => OpKind::MovePtrForward,
            Op::MovePtrBackward(_) => OpKind::MovePtrBackward,
            Op::AddData(_) => OpKind::AddData,
            Op::SubData(_) => OpKind::SubData,
            Op::Write(_) => OpKind::Write,
            Op::Read(_) => OpKind::Read,
            Op::JumpIfZero(_) => OpKind::JumpIfZero,
            Op::JumpIfNotZero(_) => OpKind::JumpIfNotZero,
            Op::SetZero => OpKind::SetZero,
            Op::ScanUntilZero(_) => OpKind::ScanUntilZero,
            Op::TransferAndZero(_) => OpKind::TransferAndZero,
        }
    }

    /// The argument as a signed number, `0` for `SetZero`
    pub fn argument(&self) -> i64 {
        match *self {
            Op::MovePtrForward(n)
            | Op::MovePtrBackward(n)
            | Op::AddData(n)
            | Op::SubData(n)
            | Op::Write(n)
            | Op::Read(n)
            | Op::JumpIfZero(n)
            | Op::JumpIfNotZero(n) => n as i64,
            Op::SetZero => 0,
            Op::ScanUntilZero(d) | Op::TransferAndZero(d) => d as i64,
        }
    }

    /// Signed pointer displacement of a move op
    pub fn pointer_delta(&self) -> Option<isize> {
        match *self {
            Op::MovePtrForward(n) => Some(n as isize),
            Op::MovePtrBackward(n) => Some(-(n as isize)),
            _ => None,
        }
    }

    /// Check if this op is a bracket
    pub fn is_jump(&self) -> bool {
        matches!(self, Op::JumpIfZero(_) | Op::JumpIfNotZero(_))
    }

    /// Check if this op replaced a whole loop
    pub fn is_specialized(&self) -> bool {
        matches!(
            self,
            Op::SetZero | Op::ScanUntilZero(_) | Op::TransferAndZero(_)
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::SetZero => write!(f, "{}", self.kind()),
            _ => write!(f, "{}({})", self.kind(), self.argument()),
        }
    }
}

//! Op stream - compiled program container
//!
//! Produced once per program by the compiler and consumed read-only by the
//! bytecode executor and the native code generators.

use std::fmt;
use std::ops::Index;

use core_types::{BfError, BfResult};

use crate::opcode::Op;
use crate::specializer::SpecializationStats;

/// An ordered sequence of [`Op`]s with resolved jump targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpStream {
    ops: Vec<Op>,
    /// Raw-program index each op was compiled from
    source_positions: Vec<usize>,
    stats: SpecializationStats,
}

impl OpStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-built op sequence
    ///
    /// The caller is responsible for jump consistency; see [`OpStream::validate`].
    /// The source position of each op is taken to be its own index.
    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self {
            source_positions: (0..ops.len()).collect(),
            ops,
            stats: SpecializationStats::default(),
        }
    }

    pub(crate) fn from_parts(
        ops: Vec<Op>,
        source_positions: Vec<usize>,
        stats: SpecializationStats,
    ) -> Self {
        debug_assert_eq!(ops.len(), source_positions.len());
        Self {
            ops,
            source_positions,
            stats,
        }
    }

    /// All ops in program order
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of ops
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the stream is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Op at `index`, if any
    pub fn get(&self, index: usize) -> Option<&Op> {
        self.ops.get(index)
    }

    /// Iterate over the ops
    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    /// Index in the raw program of the first character op `index` came from
    ///
    /// For a specialized op this is the position of the loop's `[`.
    pub fn source_position(&self, index: usize) -> Option<usize> {
        self.source_positions.get(index).copied()
    }

    /// Loop specializations performed while compiling this stream
    pub fn stats(&self) -> &SpecializationStats {
        &self.stats
    }

    /// `(open, close)` stream indices of every remaining loop, ordered by `open`
    pub fn loop_pairs(&self) -> Vec<(usize, usize)> {
        self.ops
            .iter()
            .enumerate()
            .filter_map(|(i, op)| match op {
                Op::JumpIfZero(close) => Some((i, *close)),
                _ => None,
            })
            .collect()
    }

    /// Check that every bracket pair is properly nested and that both ends
    /// point at each other.
    pub fn validate(&self) -> BfResult<()> {
        let mut open_stack: Vec<usize> = Vec::new();

        for (i, op) in self.ops.iter().enumerate() {
            match *op {
                Op::JumpIfZero(target) => {
                    if !matches!(self.ops.get(target), Some(Op::JumpIfNotZero(back)) if *back == i)
                    {
                        return Err(BfError::internal(format!(
                            "JUMP_IF_ZERO at {} targets {} which does not jump back",
                            i, target
                        )));
                    }
                    open_stack.push(i);
                }
                Op::JumpIfNotZero(target) => {
                    match open_stack.pop() {
                        Some(open) if open == target => {}
                        Some(open) => {
                            return Err(BfError::internal(format!(
                                "JUMP_IF_NOT_ZERO at {} targets {} but innermost loop opens at {}",
                                i, target, open
                            )));
                        }
                        None => {
                            return Err(BfError::internal(format!(
                                "JUMP_IF_NOT_ZERO at {} has no open loop",
                                i
                            )));
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(open) = open_stack.pop() {
            return Err(BfError::internal(format!(
                "JUMP_IF_ZERO at {} is never closed",
                open
            )));
        }
        Ok(())
    }
}

impl Index<usize> for OpStream {
    type Output = Op;

    fn index(&self, index: usize) -> &Op {
        &self.ops[index]
    }
}

impl<'a> IntoIterator for &'a OpStream {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl fmt::Display for OpStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            writeln!(f, "{:>6}  {}", i, op)?;
        }
        Ok(())
    }
}

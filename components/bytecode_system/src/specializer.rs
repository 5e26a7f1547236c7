//! Loop idiom specialization
//!
//! Replaces whole loops whose body has an exact, recognized shape with a
//! single op. Applied by the compiler as soon as a loop closes, so nested
//! loops are handled inside-out.

use crate::opcode::Op;

/// Options controlling which loop shapes may be replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecializeOptions {
    /// Only turn `[+n]`/`[-n]` into `SET_ZERO` when `n` is odd.
    ///
    /// A step that shares a factor with 256 never reaches zero from some
    /// starting values, so the plain loop would spin forever where
    /// `SET_ZERO` terminates. Off by default.
    pub strict_zeroing: bool,
}

/// Counts of loops replaced by each specialized op
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecializationStats {
    /// Loops replaced by `SET_ZERO`
    pub set_zero: usize,
    /// Loops replaced by `SCAN_UNTIL_ZERO`
    pub scan_until_zero: usize,
    /// Loops replaced by `TRANSFER_AND_ZERO`
    pub transfer_and_zero: usize,
    /// Loops kept as a jump pair
    pub plain_loops: usize,
}

impl SpecializationStats {
    /// Record one replaced loop
    pub fn record(&mut self, op: &Op) {
        match op {
            Op::SetZero => self.set_zero += 1,
            Op::ScanUntilZero(_) => self.scan_until_zero += 1,
            Op::TransferAndZero(_) => self.transfer_and_zero += 1,
            _ => {}
        }
    }

    /// Number of loops that were replaced
    pub fn specialized(&self) -> usize {
        self.set_zero + self.scan_until_zero + self.transfer_and_zero
    }
}

/// Recognizes loop bodies that can be replaced by one op
#[derive(Debug, Clone, Default)]
pub struct LoopSpecializer {
    options: SpecializeOptions,
}

impl LoopSpecializer {
    /// Create a specializer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a specializer with the given options
    pub fn with_options(options: SpecializeOptions) -> Self {
        Self { options }
    }

    /// Require an odd step before replacing a zeroing loop
    pub fn with_strict_zeroing(mut self, strict: bool) -> Self {
        self.options.strict_zeroing = strict;
        self
    }

    /// Current options
    pub fn options(&self) -> SpecializeOptions {
        self.options
    }

    /// Op replacing a loop with this body, if the body has a known shape.
    ///
    /// `body` excludes both brackets. Shapes must match exactly; there are
    /// no partial matches.
    ///
    /// # Example
    ///
    /// ```
    /// use bytecode_system::{LoopSpecializer, Op};
    ///
    /// let specializer = LoopSpecializer::new();
    /// assert_eq!(specializer.specialize(&[Op::SubData(1)]), Some(Op::SetZero));
    /// assert_eq!(
    ///     specializer.specialize(&[Op::MovePtrBackward(2)]),
    ///     Some(Op::ScanUntilZero(-2))
    /// );
    /// assert_eq!(specializer.specialize(&[Op::Write(1)]), None);
    /// ```
    pub fn specialize(&self, body: &[Op]) -> Option<Op> {
        match *body {
            [Op::AddData(step)] | [Op::SubData(step)] => {
                if self.options.strict_zeroing && step % 2 == 0 {
                    None
                } else {
                    Some(Op::SetZero)
                }
            }
            [Op::MovePtrForward(d)] => Some(Op::ScanUntilZero(d as isize)),
            [Op::MovePtrBackward(d)] => Some(Op::ScanUntilZero(-(d as isize))),
            [Op::SubData(1), Op::MovePtrForward(out), Op::AddData(1), Op::MovePtrBackward(back)]
                if out == back =>
            {
                Some(Op::TransferAndZero(out as isize))
            }
            [Op::SubData(1), Op::MovePtrBackward(out), Op::AddData(1), Op::MovePtrForward(back)]
                if out == back =>
            {
                Some(Op::TransferAndZero(-(out as isize)))
            }
            _ => None,
        }
    }
}

//! Bracket matching over the raw program
//!
//! Matches are found by counting nesting depth: starting at depth 1 on the
//! bracket itself, a scan moves forward (for `[`) or backward (for `]`),
//! adjusting depth on every bracket it passes, until depth returns to 0.

use core_types::{BfError, BfResult, RawProgram};

/// Position of the `]` matching the `[` at `open`, scanning forward
pub fn find_matching_close(instructions: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut seek = open;
    while depth > 0 {
        seek += 1;
        match instructions.get(seek)? {
            b'[' => depth += 1,
            b']' => depth -= 1,
            _ => {}
        }
    }
    Some(seek)
}

/// Position of the `[` matching the `]` at `close`, scanning backward
pub fn find_matching_open(instructions: &[u8], close: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut seek = close;
    while depth > 0 {
        seek = seek.checked_sub(1)?;
        match instructions[seek] {
            b']' => depth += 1,
            b'[' => depth -= 1,
            _ => {}
        }
    }
    Some(seek)
}

const NO_TARGET: usize = usize::MAX;

/// Position-to-position mapping between matching brackets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    targets: Vec<usize>,
    pairs: Vec<(usize, usize)>,
}

impl JumpTable {
    /// Partner of the bracket at `position`
    ///
    /// Returns `None` when `position` does not hold a bracket.
    pub fn target(&self, position: usize) -> Option<usize> {
        self.targets
            .get(position)
            .copied()
            .filter(|target| *target != NO_TARGET)
    }

    /// Partner of the bracket at `position` without checking it is a bracket
    ///
    /// Used by the interpreter's hot loop, where the instruction at
    /// `position` is already known to be a bracket.
    #[inline]
    pub fn target_unchecked(&self, position: usize) -> usize {
        self.targets[position]
    }

    /// All `(open, close)` pairs, ordered by the opening position
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

/// Match every bracket in `program`.
///
/// Fails with `UnmatchedBracket` at the original bracket's position when a
/// scan runs off either end of the program.
///
/// # Example
///
/// ```
/// use bytecode_system::resolve_jumps;
/// use core_types::RawProgram;
///
/// let table = resolve_jumps(&RawProgram::from_source("+[>[-]<]")).unwrap();
/// assert_eq!(table.pairs(), &[(1, 7), (3, 5)]);
/// assert_eq!(table.target_unchecked(7), 1);
/// ```
pub fn resolve_jumps(program: &RawProgram) -> BfResult<JumpTable> {
    let instructions = program.as_bytes();
    let mut targets = vec![NO_TARGET; instructions.len()];
    let mut matched = vec![false; instructions.len()];
    let mut pairs = Vec::new();

    for (pc, &insn) in instructions.iter().enumerate() {
        match insn {
            b'[' => {
                let close = find_matching_close(instructions, pc)
                    .ok_or_else(|| BfError::unmatched_bracket(b'[', pc))?;
                targets[pc] = close;
                targets[close] = pc;
                matched[close] = true;
                pairs.push((pc, close));
            }
            b']' if !matched[pc] => {
                // Every `]` with a partner was claimed by its `[` already,
                // so this scan can only confirm that none exists.
                let open = find_matching_open(instructions, pc)
                    .ok_or_else(|| BfError::unmatched_bracket(b']', pc))?;
                targets[pc] = open;
                targets[open] = pc;
            }
            _ => {}
        }
    }

    Ok(JumpTable { targets, pairs })
}

//! Append-only machine-code buffer
//!
//! Bytes are emitted in order; a placeholder emitted earlier can be
//! overwritten in place once its final value is known (branch fixups).

use core_types::{BfError, BfResult};

/// Growable byte buffer with in-place patching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    bytes: Vec<u8>,
}

impl CodeBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Offset the next emitted byte will land at
    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bytes emitted
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append raw bytes
    pub fn emit(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Append one byte
    pub fn emit_u8(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Append a little-endian 32-bit value
    pub fn emit_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Overwrite the byte at `offset`
    pub fn patch_u8(&mut self, offset: usize, byte: u8) -> BfResult<()> {
        let len = self.bytes.len();
        let slot = self.bytes.get_mut(offset).ok_or_else(|| {
            BfError::codegen(format!(
                "patch at {} past end of {} emitted bytes",
                offset, len
            ))
        })?;
        *slot = byte;
        Ok(())
    }

    /// Overwrite four bytes at `offset` with a little-endian value
    pub fn patch_u32(&mut self, offset: usize, value: u32) -> BfResult<()> {
        let len = self.bytes.len();
        let slot = offset
            .checked_add(4)
            .and_then(|end| self.bytes.get_mut(offset..end))
            .ok_or_else(|| {
                BfError::codegen(format!(
                    "4-byte patch at {} past end of {} emitted bytes",
                    offset, len
                ))
            })?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Emitted bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Seal the buffer
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Relative displacement from `from` (the end of the branch instruction)
/// to `to`, as the two's-complement bits of an `i32`
///
/// # Example
///
/// ```
/// use jit_compiler::compute_rel32;
///
/// assert_eq!(compute_rel32(10, 20).unwrap(), 10);
/// assert_eq!(compute_rel32(20, 10).unwrap(), (-10i32) as u32);
/// ```
pub fn compute_rel32(from: usize, to: usize) -> BfResult<u32> {
    let displacement = to as i64 - from as i64;
    let rel = i32::try_from(displacement).map_err(|_| {
        BfError::codegen(format!(
            "branch from {} to {} does not fit in 32 bits",
            from, to
        ))
    })?;
    Ok(rel as u32)
}

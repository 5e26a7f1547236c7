//! Running generated code against a tape

use core_types::{BfError, BfResult, TAPE_SIZE};
use interpreter::MemoryTape;
use tracing::debug;

use crate::exec_memory::WritableRegion;

/// Map `code`, call it once with the tape's base address, and unmap it
///
/// Generated code always starts at cell 0. On success the tape's pointer
/// is moved to the final index, which is also returned. Generated code
/// leaves early with the offending index when the pointer would leave the
/// tape; that index (negative values arrive as large unsigned numbers)
/// becomes `OutOfRangeTapeAccess`. After a fault the tape's pointer is left
/// where it was before the call, unlike the interpreters, which stop at the
/// last in-range position. Cells hold the same values either way.
pub fn run_native(code: &[u8], tape: &mut MemoryTape) -> BfResult<usize> {
    let mut region = WritableRegion::allocate(code.len())?;
    region.write(code)?;
    let region = region.make_executable()?;
    debug!(bytes = region.code_len(), "invoking generated code");

    let entry = region.entry();
    // SAFETY: the code was generated for the `EntryPoint` ABI, only touches
    // tape cells in `[0, TAPE_SIZE)` of the pointer it is given, and the
    // region stays mapped until after the call returns.
    let index = unsafe { entry(tape.as_mut_ptr()) };
    region.release()?;

    if index >= TAPE_SIZE as u64 {
        return Err(BfError::out_of_range(index as i64));
    }
    let index = index as usize;
    tape.set_pointer(index)?;
    Ok(index)
}

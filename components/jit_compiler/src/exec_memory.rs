//! Executable memory arena
//!
//! Generated code goes through two states, each owned by its own type:
//! a [`WritableRegion`] (read/write, receives the bytes) and an
//! [`ExecutableRegion`] (read/execute, can be called). The only way from
//! one to the other is [`WritableRegion::make_executable`], which consumes
//! the writable handle, so no handle ever exists that can both write and
//! execute the mapping.

use std::io;
use std::ptr;

use core_types::{BfError, BfResult};
use tracing::error;

/// Signature of generated code: takes the tape base, returns the final
/// data index
pub type EntryPoint = unsafe extern "C" fn(tape: *mut u8) -> u64;

/// An anonymous private mapping, unmapped exactly once
#[derive(Debug)]
struct Mapping {
    ptr: *mut u8,
    len: usize,
}

impl Mapping {
    fn map(len: usize) -> BfResult<Self> {
        if len == 0 {
            return Err(BfError::arena("cannot map an empty region"));
        }
        // SAFETY: anonymous mapping with no address hint; the result is
        // checked against MAP_FAILED before use.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(BfError::arena(format!(
                "mmap of {} bytes failed: {}",
                len,
                io::Error::last_os_error()
            )));
        }
        Ok(Self {
            ptr: ptr.cast(),
            len,
        })
    }

    fn protect(&mut self, prot: libc::c_int) -> BfResult<()> {
        // SAFETY: `ptr`/`len` describe a live mapping created by `map`.
        let rc = unsafe { libc::mprotect(self.ptr.cast(), self.len, prot) };
        if rc != 0 {
            return Err(BfError::arena(format!(
                "mprotect failed: {}",
                io::Error::last_os_error()
            )));
        }
        Ok(())
    }

    fn unmap(&mut self) -> BfResult<()> {
        if self.ptr.is_null() {
            return Ok(());
        }
        // SAFETY: `ptr`/`len` describe a live mapping created by `map`, and
        // `ptr` is nulled below so it is never unmapped twice.
        let rc = unsafe { libc::munmap(self.ptr.cast(), self.len) };
        self.ptr = ptr::null_mut();
        if rc != 0 {
            return Err(BfError::arena(format!(
                "munmap failed: {}",
                io::Error::last_os_error()
            )));
        }
        Ok(())
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            error!(error = %e, "failed to release code region");
        }
    }
}

/// A mapped region that can be written but not executed
#[derive(Debug)]
pub struct WritableRegion {
    mapping: Mapping,
    code_len: usize,
}

impl WritableRegion {
    /// Map `len` bytes of zeroed read/write memory
    pub fn allocate(len: usize) -> BfResult<Self> {
        Ok(Self {
            mapping: Mapping::map(len)?,
            code_len: 0,
        })
    }

    /// Size of the mapping
    pub fn len(&self) -> usize {
        self.mapping.len
    }

    /// Whether the mapping is empty (never true for an allocated region)
    pub fn is_empty(&self) -> bool {
        self.mapping.len == 0
    }

    /// Copy `code` to the start of the region
    pub fn write(&mut self, code: &[u8]) -> BfResult<()> {
        if code.len() > self.mapping.len {
            return Err(BfError::arena(format!(
                "{} bytes of code do not fit in a {} byte region",
                code.len(),
                self.mapping.len
            )));
        }
        // SAFETY: the mapping is writable and at least `code.len()` bytes,
        // and a fresh mapping cannot overlap `code`.
        unsafe {
            ptr::copy_nonoverlapping(code.as_ptr(), self.mapping.ptr, code.len());
        }
        self.code_len = code.len();
        Ok(())
    }

    /// Drop write permission and grant execute permission
    ///
    /// On failure the region is unmapped.
    pub fn make_executable(mut self) -> BfResult<ExecutableRegion> {
        if self.code_len == 0 {
            return Err(BfError::arena("no code written to region"));
        }
        self.mapping.protect(libc::PROT_READ | libc::PROT_EXEC)?;
        Ok(ExecutableRegion {
            mapping: self.mapping,
            code_len: self.code_len,
        })
    }
}

/// A mapped region that can be executed but not written
#[derive(Debug)]
pub struct ExecutableRegion {
    mapping: Mapping,
    code_len: usize,
}

impl ExecutableRegion {
    /// Number of code bytes in the region
    pub fn code_len(&self) -> usize {
        self.code_len
    }

    /// Entry point at the start of the region
    ///
    /// Calling it is only sound while `self` is alive.
    pub fn entry(&self) -> EntryPoint {
        // SAFETY: the region holds a complete function with the
        // `EntryPoint` ABI at offset 0 and is mapped read/execute.
        unsafe { std::mem::transmute::<*mut u8, EntryPoint>(self.mapping.ptr) }
    }

    /// Unmap the region
    pub fn release(mut self) -> BfResult<()> {
        self.mapping.unmap()
    }
}

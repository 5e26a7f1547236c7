//! File descriptors and I/O helpers shared by the native backends

/// File descriptors generated code reads from and writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoFds {
    /// Source of `,`
    pub input: i32,
    /// Sink of `.`
    pub output: i32,
}

impl IoFds {
    /// Read from `input`, write to `output`
    pub fn new(input: i32, output: i32) -> Self {
        Self { input, output }
    }
}

impl Default for IoFds {
    fn default() -> Self {
        Self {
            input: libc::STDIN_FILENO,
            output: libc::STDOUT_FILENO,
        }
    }
}

/// Repeat a one-byte syscall while it fails with `EINTR`
fn retry_interrupted(mut call: impl FnMut() -> libc::ssize_t) {
    while call() < 0
        && std::io::Error::last_os_error().kind() == std::io::ErrorKind::Interrupted
    {}
}

/// Write the byte at `cell` to `fd`, `count` times
///
/// Called from Cranelift-generated code. Write errors are not reported.
pub(crate) unsafe extern "C" fn write_cell(fd: i32, cell: *const u8, count: u64) {
    for _ in 0..count {
        retry_interrupted(|| libc::write(fd, cell.cast(), 1));
    }
}

/// Read `count` bytes from `fd` into `cell`, keeping the last one
///
/// At end of input the cell keeps its value.
pub(crate) unsafe extern "C" fn read_cell(fd: i32, cell: *mut u8, count: u64) {
    for _ in 0..count {
        retry_interrupted(|| libc::read(fd, cell.cast(), 1));
    }
}

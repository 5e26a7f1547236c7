//! Program loading

use std::path::Path;

use core_types::RawProgram;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Read `path` and keep only the eight opcode characters
///
/// The file is read as bytes, so non-UTF-8 comments are accepted.
pub fn load_program(path: impl AsRef<Path>) -> CliResult<RawProgram> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CliError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let program = RawProgram::from_bytes(&bytes);
    debug!(
        path = %path.display(),
        file_bytes = bytes.len(),
        program_len = program.len(),
        "loaded program"
    );
    Ok(program)
}

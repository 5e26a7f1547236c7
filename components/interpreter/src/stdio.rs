//! Process standard streams for the `Executor` implementations

use std::io::{self, BufWriter, StdinLock, StdoutLock, Write};

use core_types::BfResult;

/// Run `body` against locked stdin and buffered stdout
///
/// Output is flushed even when `body` fails, so bytes written before a
/// runtime error still reach the terminal.
pub(crate) fn with_std_streams<T>(
    body: impl FnOnce(&mut StdinLock<'static>, &mut BufWriter<StdoutLock<'static>>) -> BfResult<T>,
) -> BfResult<T> {
    let mut input = io::stdin().lock();
    let mut output = BufWriter::new(io::stdout().lock());
    let result = body(&mut input, &mut output);
    output.flush()?;
    result
}

//! Two-phase execution capability shared by every strategy.

use crate::{BfResult, RawProgram};

/// A way of running a program: an optional preparation step followed by
/// execution on the process's standard streams.
///
/// A strategy is picked once at start-up and driven through this trait;
/// interpreters and native code generators are interchangeable behind it.
pub trait Executor {
    /// Short, stable name used in diagnostics
    fn name(&self) -> &'static str;

    /// Pre-process the program (jump tables, op streams, native code).
    ///
    /// Called once before [`Executor::execute`]. The default does nothing.
    fn prepare(&mut self, _program: &RawProgram) -> BfResult<()> {
        Ok(())
    }

    /// Run the program against a fresh tape
    fn execute(&mut self, program: &RawProgram) -> BfResult<()>;
}

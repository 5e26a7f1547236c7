//! Contract compliance tests for core_types
//!
//! These tests pin the public surface other components rely on.

use core_types::{BfError, BfResult, ErrorKind, Executor, RawProgram, TAPE_SIZE};

struct CountingExecutor {
    prepared: usize,
    executed: usize,
}

impl Executor for CountingExecutor {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn execute(&mut self, program: &RawProgram) -> BfResult<()> {
        if program.is_empty() {
            return Err(BfError::internal("empty program"));
        }
        self.executed += 1;
        Ok(())
    }
}

/// Contract: canonical tape capacity
#[test]
fn test_tape_size_is_canonical() {
    assert_eq!(TAPE_SIZE, 30000);
}

/// Contract: prepare has a no-op default
#[test]
fn test_executor_default_prepare() {
    let mut executor = CountingExecutor {
        prepared: 0,
        executed: 0,
    };
    let program = RawProgram::from_source("+");
    executor.prepare(&program).unwrap();
    executor.execute(&program).unwrap();
    assert_eq!(executor.prepared, 0);
    assert_eq!(executor.executed, 1);
    assert_eq!(executor.name(), "counting");
}

/// Contract: executors are usable as trait objects
#[test]
fn test_executor_is_object_safe() {
    let mut boxed: Box<dyn Executor> = Box::new(CountingExecutor {
        prepared: 0,
        executed: 0,
    });
    let err = boxed.execute(&RawProgram::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalError);
}

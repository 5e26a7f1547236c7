//! Contract tests for interpreter API
//!
//! These tests verify the public API of each tier.

use bytecode_system::CompileOptions;
use core_types::{Executor, RawProgram};
use interpreter::{BytecodeInterpreter, JumpTableInterpreter, MemoryTape, SimpleInterpreter};

/// Every tier reports a stable strategy name
#[test]
fn test_executor_name_contract() {
    assert_eq!(SimpleInterpreter::new().name(), "simple");
    assert_eq!(JumpTableInterpreter::new().name(), "jump-table");
    assert_eq!(BytecodeInterpreter::unspecialized().name(), "bytecode");
    assert_eq!(BytecodeInterpreter::optimized().name(), "optimized");
}

/// prepare() surfaces bracket errors before anything runs
#[test]
fn test_prepare_contract() {
    let program = RawProgram::from_source("+]");
    assert!(JumpTableInterpreter::new().prepare(&program).is_err());
    assert!(BytecodeInterpreter::optimized().prepare(&program).is_err());
    // The naive tier has nothing to prepare.
    assert!(SimpleInterpreter::new().prepare(&program).is_ok());
}

/// BytecodeInterpreter::new() keeps the options it was given
#[test]
fn test_bytecode_interpreter_options_contract() {
    let options = CompileOptions::default().with_strict_zeroing(true);
    let interp = BytecodeInterpreter::new(options).with_trace(true);
    assert_eq!(interp.options(), &options);
    assert!(interp.stream().is_none());
    assert!(interp.profile().is_none());
}

/// MemoryTape::new() starts zeroed at cell 0
#[test]
fn test_memory_tape_contract() {
    let tape = MemoryTape::default();
    assert_eq!(tape.pointer(), 0);
    assert_eq!(tape.current(), 0);
}

//! End-to-End CLI Integration Tests
//!
//! Tests the toolchain through the bf_cli Runtime API, from a file on disk
//! to the run report.

use std::fs;

use bf_cli::{CliError, Runtime, RuntimeConfig, Strategy};
use core_types::ErrorKind;
use tempfile::TempDir;

fn write_program(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

/// Test: Each strategy reports its own name
#[test]
fn test_e2e_report_names_strategy() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, "mul.b", "++++++[>+++++++<-]");

    let cases = [
        (Strategy::Simple, "simple"),
        (Strategy::JumpTable, "jump-table"),
        (Strategy::Bytecode, "bytecode"),
        (Strategy::Optimized, "optimized"),
        (Strategy::CraneliftJit, "cranelift-jit"),
    ];
    for (strategy, name) in cases {
        let report = Runtime::new(RuntimeConfig::new(strategy))
            .execute_file(&path)
            .unwrap();
        assert_eq!(report.strategy, name);
        assert_eq!(report.program_len, 18);
    }
}

/// Test: Trace is accepted by every strategy
#[test]
fn test_e2e_trace_with_any_strategy() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, "loop.b", "+++[-]");
    for strategy in [Strategy::Optimized, Strategy::JumpTable] {
        let config = RuntimeConfig::new(strategy).with_trace(true);
        assert!(Runtime::new(config).execute_file(&path).is_ok());
    }
}

/// Test: Runtime errors carry the BF error kind
#[test]
fn test_e2e_errors() {
    let dir = TempDir::new().unwrap();
    let unmatched = write_program(&dir, "open.b", "+[");
    let off_tape = write_program(&dir, "left.b", "+[<]");

    let err = Runtime::default().execute_file(&unmatched).unwrap_err();
    assert!(matches!(err, CliError::Bf(ref e) if e.kind() == ErrorKind::UnmatchedBracket));

    let err = Runtime::new(RuntimeConfig::new(Strategy::Simple))
        .execute_file(&off_tape)
        .unwrap_err();
    assert!(matches!(err, CliError::Bf(ref e) if e.kind() == ErrorKind::OutOfRangeTapeAccess));
}

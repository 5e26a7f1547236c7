//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> RawProgram -> OpStream -> BytecodeExecutor -> output

use bytecode_system::{compile, resolve_jumps, CompileOptions, Op};
use core_types::{BfError, RawProgram};
use integration_tests::{programs, run_bytecode, run_simple};

/// Test: Hello World through the optimized pipeline matches the naive interpreter
#[test]
fn test_full_pipeline_hello_world() {
    let optimized = run_bytecode(programs::HELLO_WORLD, b"", &CompileOptions::default());
    let naive = run_simple(programs::HELLO_WORLD, b"");

    optimized.result.unwrap();
    naive.result.unwrap();
    assert_eq!(optimized.output, b"Hello World!\n");
    assert_eq!(optimized.output, naive.output);
    assert_eq!(optimized.tape, naive.tape);
}

/// Test: A clearing loop becomes exactly one SET_ZERO and leaves zero
#[test]
fn test_full_pipeline_clear_loop() {
    let program = RawProgram::from_source("+++++[-]");
    let stream = compile(&program, &CompileOptions::default()).unwrap();
    assert_eq!(stream.ops(), &[Op::AddData(5), Op::SetZero]);

    let outcome = run_bytecode("+++++[-]", b"", &CompileOptions::default());
    outcome.result.unwrap();
    assert_eq!(outcome.tape.current(), 0);
}

/// Test: Loop idioms are recognized only in their exact shapes
#[test]
fn test_full_pipeline_specialized_shapes() {
    let cases: [(&str, Op); 3] = [
        ("[++]", Op::SetZero),
        ("[>>>]", Op::ScanUntilZero(3)),
        ("[->>+<<]", Op::TransferAndZero(2)),
    ];
    for (source, expected) in cases {
        let stream = compile(&RawProgram::from_source(source), &CompileOptions::default()).unwrap();
        assert_eq!(stream.ops(), &[expected], "{}", source);
    }
}

/// Test: Unmatched brackets are reported at the offending bracket
#[test]
fn test_full_pipeline_unmatched_brackets() {
    let err = compile(&RawProgram::from_source("[+"), &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        BfError::UnmatchedBracket {
            bracket: '[',
            position: 0
        }
    ));

    let err = compile(&RawProgram::from_source("+]"), &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        BfError::UnmatchedBracket {
            bracket: ']',
            position: 1
        }
    ));
}

/// Test: The compiler's loops pair up the same brackets as the resolver
#[test]
fn test_full_pipeline_pairs_agree_with_resolver() {
    for (name, source, _) in programs::TERMINATING {
        let program = RawProgram::from_source(source);
        let table = resolve_jumps(&program).unwrap();
        let stream = compile(&program, &CompileOptions::unspecialized()).unwrap();

        let from_stream: Vec<(usize, usize)> = stream
            .loop_pairs()
            .into_iter()
            .map(|(open, close)| {
                (
                    stream.source_position(open).unwrap(),
                    stream.source_position(close).unwrap(),
                )
            })
            .collect();
        assert_eq!(from_stream, table.pairs(), "{}", name);
    }
}

/// Test: Comments never reach the pipeline
#[test]
fn test_full_pipeline_comments_are_ignored() {
    let commented = run_bytecode(
        "print A: ++++++++[>++++++++<-]>+. done",
        b"",
        &CompileOptions::default(),
    );
    commented.result.unwrap();
    assert_eq!(commented.output, b"A");
}

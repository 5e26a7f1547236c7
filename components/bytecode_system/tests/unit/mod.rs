//! Unit tests for the op-stream pipeline

use bytecode_system::{
    compile, compile_unspecialized, find_matching_close, resolve_jumps, CompileOptions, Op,
    OpKind, OpStream,
};
use core_types::{BfError, ErrorKind, RawProgram};

fn compiled(source: &str) -> OpStream {
    compile(&RawProgram::from_source(source), &CompileOptions::default()).unwrap()
}

// ============================================================================
// Fusion
// ============================================================================

#[test]
fn test_comments_do_not_break_runs() {
    // Non-opcode characters are stripped before fusion.
    let stream = compiled("+ + +\n+ add four");
    assert_eq!(stream.ops(), &[Op::AddData(4)]);
}

#[test]
fn test_alternating_characters_are_not_fused() {
    let stream = compiled("+-+-");
    assert_eq!(
        stream.ops(),
        &[Op::AddData(1), Op::SubData(1), Op::AddData(1), Op::SubData(1)]
    );
}

#[test]
fn test_io_runs_are_fused() {
    let stream = compiled("...,,");
    assert_eq!(stream.ops(), &[Op::Write(3), Op::Read(2)]);
}

#[test]
fn test_long_run_count() {
    let source = "+".repeat(300);
    let stream = compiled(&source);
    assert_eq!(stream.ops(), &[Op::AddData(300)]);
}

// ============================================================================
// Jumps
// ============================================================================

#[test]
fn test_hello_world_stream_is_consistent() {
    let source = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
    let stream = compiled(source);
    assert!(stream.validate().is_ok());
    for (open, close) in stream.loop_pairs() {
        assert_eq!(stream[open], Op::JumpIfZero(close));
        assert_eq!(stream[close], Op::JumpIfNotZero(open));
        assert!(open < close);
    }
}

#[test]
fn test_compiler_and_resolver_agree_on_pairs() {
    let programs = [
        "[]",
        "+[>[-]<[->+<]]",
        "++[>++[>+<-]<-]>>.",
        "[[[]]][[][]]",
        ",[.,]",
    ];
    for source in programs {
        let program = RawProgram::from_source(source);
        let table = resolve_jumps(&program).unwrap();
        let stream = compile_unspecialized(&program).unwrap();

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
        assert_eq!(from_stream, table.pairs(), "program {:?}", source);
    }
}

#[test]
fn test_unmatched_brackets_agree_between_resolver_and_compiler() {
    for source in ["[", "+[[]", "]", "[]]", "[[+]"] {
        let program = RawProgram::from_source(source);
        let resolved = resolve_jumps(&program).unwrap_err();
        let compiled = compile_unspecialized(&program).unwrap_err();
        assert_eq!(resolved.kind(), ErrorKind::UnmatchedBracket);
        assert_eq!(
            resolved.to_string(),
            compiled.to_string(),
            "program {:?}",
            source
        );
    }
}

#[test]
fn test_unmatched_close_after_balanced_loops() {
    let err = compiled_err("[-]+]");
    assert!(matches!(
        err,
        BfError::UnmatchedBracket {
            bracket: ']',
            position: 4
        }
    ));
}

fn compiled_err(source: &str) -> BfError {
    compile(&RawProgram::from_source(source), &CompileOptions::default()).unwrap_err()
}

#[test]
fn test_find_matching_close_in_raw_bytes() {
    assert_eq!(find_matching_close(b"+[[-]>]", 1), Some(6));
}

// ============================================================================
// Specialization
// ============================================================================

#[test]
fn test_set_zero_after_prefix() {
    let stream = compiled("+++++[-]");
    assert_eq!(stream.ops(), &[Op::AddData(5), Op::SetZero]);
}

#[test]
fn test_set_zero_from_plus_loop() {
    assert_eq!(compiled("[+]").ops(), &[Op::SetZero]);
    assert_eq!(compiled("[++]").ops(), &[Op::SetZero]);
}

#[test]
fn test_scan_loops() {
    assert_eq!(compiled("[>]").ops(), &[Op::ScanUntilZero(1)]);
    assert_eq!(compiled("[<<<]").ops(), &[Op::ScanUntilZero(-3)]);
}

#[test]
fn test_transfer_loops() {
    assert_eq!(compiled("[->+<]").ops(), &[Op::TransferAndZero(1)]);
    assert_eq!(compiled("[-<<+>>]").ops(), &[Op::TransferAndZero(-2)]);
}

#[test]
fn test_transfer_with_wider_step_is_kept() {
    let stream = compiled("[->++<]");
    assert_eq!(stream.stats().transfer_and_zero, 0);
    assert_eq!(stream.len(), 6);
}

#[test]
fn test_loop_with_output_is_kept() {
    let stream = compiled("[-.]");
    assert_eq!(
        stream.ops(),
        &[
            Op::JumpIfZero(3),
            Op::SubData(1),
            Op::Write(1),
            Op::JumpIfNotZero(0)
        ]
    );
}

#[test]
fn test_nested_specialized_loops_leave_valid_outer_jumps() {
    let stream = compiled("+[>[-]<[->+<]-]");
    assert!(stream.validate().is_ok());
    let kinds: Vec<OpKind> = stream.iter().map(|op| op.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            OpKind::AddData,
            OpKind::JumpIfZero,
            OpKind::MovePtrForward,
            OpKind::SetZero,
            OpKind::MovePtrBackward,
            OpKind::TransferAndZero,
            OpKind::SubData,
            OpKind::JumpIfNotZero,
        ]
    );
    assert_eq!(stream[1], Op::JumpIfZero(7));
}

#[test]
fn test_specialized_op_keeps_open_bracket_position() {
    let stream = compiled(">>[-]");
    assert_eq!(stream.source_position(1), Some(2));
}

#[test]
fn test_dump_format() {
    let dump = compiled("+[->+<]").to_string();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("ADD_DATA(1)"));
    assert!(lines[1].ends_with("TRANSFER_AND_ZERO(1)"));
}

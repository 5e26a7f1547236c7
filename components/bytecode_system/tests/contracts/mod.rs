//! Contract tests for the bytecode_system public API

use bytecode_system::{
    compile, compile_unspecialized, resolve_jumps, CompileOptions, LoopSpecializer, Op,
    OpStreamCompiler,
};
use core_types::{ErrorKind, RawProgram};

/// compile() returns a stream whose jumps validate
#[test]
fn test_compile_contract() {
    let program = RawProgram::from_source("+[>+<-]");
    let stream = compile(&program, &CompileOptions::default()).unwrap();
    assert!(stream.validate().is_ok());
}

/// OpStreamCompiler::compile() and compile() produce the same stream
#[test]
fn test_compiler_struct_contract() {
    let program = RawProgram::from_source("++[>]<[-]");
    let options = CompileOptions::default();
    let direct = OpStreamCompiler::new(options).compile(&program).unwrap();
    assert_eq!(direct, compile(&program, &options).unwrap());
}

/// compile_unspecialized() never emits specialized ops
#[test]
fn test_compile_unspecialized_contract() {
    let program = RawProgram::from_source("[-][>][->+<]");
    let stream = compile_unspecialized(&program).unwrap();
    assert!(stream.iter().all(|op| !op.is_specialized()));
    assert_eq!(stream.stats().plain_loops, 3);
}

/// resolve_jumps() reports unmatched brackets as UnmatchedBracket
#[test]
fn test_resolve_jumps_contract() {
    let err = resolve_jumps(&RawProgram::from_source("[[]")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnmatchedBracket);
    assert_eq!(err.to_string(), "unmatched '[' at position 0");
}

/// LoopSpecializer::specialize() returns None for unknown shapes
#[test]
fn test_specializer_contract() {
    let specializer = LoopSpecializer::new();
    assert_eq!(specializer.specialize(&[Op::Read(1)]), None);
    assert!(specializer.specialize(&[Op::AddData(1)]).is_some());
}

/// The empty program compiles to the empty stream
#[test]
fn test_empty_program_contract() {
    let stream = compile(&RawProgram::from_source(""), &CompileOptions::default()).unwrap();
    assert!(stream.is_empty());
    assert_eq!(stream.stats().specialized(), 0);
}

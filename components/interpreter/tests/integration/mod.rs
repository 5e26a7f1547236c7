//! Interpreter tiers must agree with each other

use bytecode_system::{compile, compile_unspecialized, CompileOptions};
use core_types::{BfResult, RawProgram};
use interpreter::{BytecodeExecutor, JumpTableInterpreter, MemoryTape, SimpleInterpreter};

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

type Outcome = (MemoryTape, Vec<u8>);

fn simple(source: &str, input: &[u8]) -> BfResult<Outcome> {
    let mut tape = MemoryTape::new();
    let mut output = Vec::new();
    let mut input = input;
    SimpleInterpreter::new().run(
        &RawProgram::from_source(source),
        &mut tape,
        &mut input,
        &mut output,
    )?;
    Ok((tape, output))
}

fn jump_table(source: &str, input: &[u8]) -> BfResult<Outcome> {
    let mut tape = MemoryTape::new();
    let mut output = Vec::new();
    let mut input = input;
    JumpTableInterpreter::new().run(
        &RawProgram::from_source(source),
        &mut tape,
        &mut input,
        &mut output,
    )?;
    Ok((tape, output))
}

fn bytecode(source: &str, input: &[u8], specialize: bool) -> BfResult<Outcome> {
    let program = RawProgram::from_source(source);
    let stream = if specialize {
        compile(&program, &CompileOptions::default())?
    } else {
        compile_unspecialized(&program)?
    };
    let mut tape = MemoryTape::new();
    let mut output = Vec::new();
    let mut input = input;
    BytecodeExecutor::new().run(&stream, &mut tape, &mut input, &mut output)?;
    Ok((tape, output))
}

fn assert_all_agree(source: &str, input: &[u8]) {
    let reference = simple(source, input).unwrap();
    assert_eq!(jump_table(source, input).unwrap(), reference, "jump-table");
    assert_eq!(bytecode(source, input, false).unwrap(), reference, "bytecode");
    assert_eq!(bytecode(source, input, true).unwrap(), reference, "optimized");
}

#[test]
fn test_hello_world() {
    let (_, output) = simple(HELLO_WORLD, b"").unwrap();
    assert_eq!(output, b"Hello World!\n");
    assert_all_agree(HELLO_WORLD, b"");
}

#[test]
fn test_echo_until_eof() {
    assert_all_agree(",[.[-],]", b"some input\n");
}

#[test]
fn test_reverse_input() {
    assert_all_agree(">,[>,]<[.<]", b"stressed");
    let (_, output) = simple(">,[>,]<[.<]", b"stressed").unwrap();
    assert_eq!(output, b"desserts");
}

#[test]
fn test_specialized_idioms() {
    assert_all_agree("+++[->>+<<]>>[-<+>]<[>]++[<]>[-]", b"");
}

#[test]
fn test_out_of_range_agrees() {
    for source in ["<", "+[>+]", ">+[-<<+>>]"] {
        let reference = simple(source, b"").unwrap_err().to_string();
        assert_eq!(jump_table(source, b"").unwrap_err().to_string(), reference);
        assert_eq!(bytecode(source, b"", false).unwrap_err().to_string(), reference);
        assert_eq!(bytecode(source, b"", true).unwrap_err().to_string(), reference);
    }
}

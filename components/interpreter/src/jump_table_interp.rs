//! Jump-table interpreter
//!
//! Same character-at-a-time walk as the naive interpreter, but loop partners
//! come from a table built once before execution.

use std::io::{Read, Write};

use bytecode_system::{resolve_jumps, JumpTable};
use core_types::{BfError, BfResult, Executor, RawProgram};
use tracing::debug;

use crate::stdio::with_std_streams;
use crate::tape::MemoryTape;

/// Interpreter over the raw program with precomputed bracket targets
#[derive(Debug, Clone, Default)]
pub struct JumpTableInterpreter {
    table: Option<JumpTable>,
}

impl JumpTableInterpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self::default()
    }

    /// Table built by the last `prepare`, if any
    pub fn table(&self) -> Option<&JumpTable> {
        self.table.as_ref()
    }

    /// Resolve brackets and run `program` on `tape`
    pub fn run<R, W>(
        &self,
        program: &RawProgram,
        tape: &mut MemoryTape,
        input: &mut R,
        output: &mut W,
    ) -> BfResult<()>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let table = resolve_jumps(program)?;
        interpret(program, &table, tape, input, output)
    }
}

fn interpret<R, W>(
    program: &RawProgram,
    table: &JumpTable,
    tape: &mut MemoryTape,
    input: &mut R,
    output: &mut W,
) -> BfResult<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let instructions = program.as_bytes();
    let mut pc = 0;

    while pc < instructions.len() {
        match instructions[pc] {
            b'>' => tape.move_by(1)?,
            b'<' => tape.move_by(-1)?,
            b'+' => tape.add(1),
            b'-' => tape.sub(1),
            b'.' => tape.write_current(output)?,
            b',' => tape.read_current(input)?,
            b'[' => {
                if tape.current() == 0 {
                    pc = table.target_unchecked(pc);
                }
            }
            b']' => {
                if tape.current() != 0 {
                    pc = table.target_unchecked(pc);
                }
            }
            other => {
                return Err(BfError::internal(format!(
                    "bad character {:?} at {}",
                    other as char, pc
                )));
            }
        }
        pc += 1;
    }
    Ok(())
}

impl Executor for JumpTableInterpreter {
    fn name(&self) -> &'static str {
        "jump-table"
    }

    fn prepare(&mut self, program: &RawProgram) -> BfResult<()> {
        let table = resolve_jumps(program)?;
        debug!(pairs = table.pairs().len(), "resolved jump table");
        self.table = Some(table);
        Ok(())
    }

    fn execute(&mut self, program: &RawProgram) -> BfResult<()> {
        if self.table.is_none() {
            self.prepare(program)?;
        }
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| BfError::internal("jump table missing after prepare"))?;
        let mut tape = MemoryTape::new();
        with_std_streams(|input, output| interpret(program, table, &mut tape, input, output))
    }
}

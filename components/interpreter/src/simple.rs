//! Naive interpreter
//!
//! Walks the raw program one character at a time and finds loop partners by
//! scanning at run time. Brackets are only checked when a jump actually
//! needs its partner, so an unmatched bracket that is never taken goes
//! unnoticed.

use std::io::{Read, Write};

use bytecode_system::{find_matching_close, find_matching_open};
use core_types::{BfError, BfResult, Executor, RawProgram};

use crate::stdio::with_std_streams;
use crate::tape::MemoryTape;

/// Character-at-a-time interpreter with no pre-processing
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleInterpreter;

impl SimpleInterpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self
    }

    /// Run `program` on `tape`
    ///
    /// # Example
    ///
    /// ```
    /// use core_types::RawProgram;
    /// use interpreter::{MemoryTape, SimpleInterpreter};
    ///
    /// let program = RawProgram::from_source("++++++++[>++++++++<-]>+.");
    /// let mut tape = MemoryTape::new();
    /// let mut output = Vec::new();
    /// SimpleInterpreter::new()
    ///     .run(&program, &mut tape, &mut std::io::empty(), &mut output)
    ///     .unwrap();
    /// assert_eq!(output, b"A");
    /// ```
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
                        pc = find_matching_close(instructions, pc)
                            .ok_or_else(|| BfError::unmatched_bracket(b'[', pc))?;
                    }
                }
                b']' => {
                    if tape.current() != 0 {
                        pc = find_matching_open(instructions, pc)
                            .ok_or_else(|| BfError::unmatched_bracket(b']', pc))?;
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
}

impl Executor for SimpleInterpreter {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn execute(&mut self, program: &RawProgram) -> BfResult<()> {
        let mut tape = MemoryTape::new();
        with_std_streams(|input, output| self.run(program, &mut tape, input, output))
    }
}

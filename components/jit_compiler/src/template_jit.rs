//! Template JIT: hand-encoded x86-64
//!
//! Each op is expanded to a fixed byte template from [`crate::x86`]. Branch
//! targets are labels; a branch to a label that is already bound gets its
//! displacement immediately (loop back-edges), any other branch gets a zero
//! placeholder and a fixup that the second pass patches once every label is
//! bound.
//!
//! Generated code layout:
//!
//! ```text
//! prologue
//! ops...
//! exit:      epilogue            ; returns rbx
//! fault_rcx: mov rbx, rcx        ; out-of-range transfer target
//!            jmp exit
//! ```

use std::io::{self, Write};

use bytecode_system::{compile, CompileOptions, Op, OpStream};
use core_types::{BfError, BfResult, Executor, RawProgram, TAPE_SIZE};
use interpreter::MemoryTape;
use tracing::debug;

use crate::code_buffer::{compute_rel32, CodeBuffer};
use crate::io::IoFds;
use crate::native::run_native;
use crate::x86;

/// Whether generated template code can run on this host
pub const TEMPLATE_JIT_SUPPORTED: bool = cfg!(all(target_arch = "x86_64", target_os = "linux"));

/// A branch target, bound to a code offset at most once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Label(usize);

/// A rel32 field at `at` that must point at `label`
#[derive(Debug, Clone, Copy)]
struct Fixup {
    at: usize,
    label: Label,
}

/// Single-use x86-64 code generator for one op stream
#[derive(Debug)]
pub struct TemplateCompiler {
    fds: IoFds,
    buf: CodeBuffer,
    labels: Vec<Option<usize>>,
    fixups: Vec<Fixup>,
    /// `(body start, loop end)` of every open loop
    open_loops: Vec<(Label, Label)>,
    exit: Label,
    fault_rcx: Label,
}

impl TemplateCompiler {
    /// Create a generator using `fds` for I/O
    pub fn new(fds: IoFds) -> Self {
        let mut compiler = Self {
            fds,
            buf: CodeBuffer::with_capacity(4096),
            labels: Vec::new(),
            fixups: Vec::new(),
            open_loops: Vec::new(),
            exit: Label(0),
            fault_rcx: Label(0),
        };
        compiler.exit = compiler.new_label();
        compiler.fault_rcx = compiler.new_label();
        compiler
    }

    /// Generate machine code for `stream`
    pub fn compile(mut self, stream: &OpStream) -> BfResult<Vec<u8>> {
        self.buf.emit(&x86::PROLOGUE);
        for op in stream {
            self.emit_op(op)?;
        }

        let exit = self.exit;
        self.bind(exit)?;
        self.buf.emit(&x86::EPILOGUE);

        let fault_rcx = self.fault_rcx;
        self.bind(fault_rcx)?;
        self.buf.emit(&x86::MOV_RBX_RCX);
        self.branch(&x86::JMP_REL32, exit)?;

        self.resolve_fixups()?;
        debug!(
            ops = stream.len(),
            bytes = self.buf.len(),
            "generated template code"
        );
        Ok(self.buf.finish())
    }

    fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    fn bind(&mut self, label: Label) -> BfResult<()> {
        let offset = self.buf.offset();
        let slot = self
            .labels
            .get_mut(label.0)
            .ok_or_else(|| BfError::codegen(format!("unknown label {}", label.0)))?;
        if slot.is_some() {
            return Err(BfError::codegen(format!("label {} bound twice", label.0)));
        }
        *slot = Some(offset);
        Ok(())
    }

    /// Emit `opcode` followed by a rel32 to `label`
    fn branch(&mut self, opcode: &[u8], label: Label) -> BfResult<()> {
        self.buf.emit(opcode);
        let at = self.buf.offset();
        match self.labels.get(label.0).copied().flatten() {
            Some(target) => self.buf.emit_u32(compute_rel32(at + 4, target)?),
            None => {
                self.fixups.push(Fixup { at, label });
                self.buf.emit_u32(0);
            }
        }
        Ok(())
    }

    fn resolve_fixups(&mut self) -> BfResult<()> {
        for fixup in std::mem::take(&mut self.fixups) {
            let target = self
                .labels
                .get(fixup.label.0)
                .copied()
                .flatten()
                .ok_or_else(|| {
                    BfError::codegen(format!(
                        "branch at {} targets unbound label {}",
                        fixup.at, fixup.label.0
                    ))
                })?;
            let rel = compute_rel32(fixup.at + 4, target)?;
            self.buf.patch_u32(fixup.at, rel)?;
        }
        Ok(())
    }

    /// `add`/`sub rbx, distance` followed by the bounds check
    fn move_pointer(&mut self, delta: i64) -> BfResult<()> {
        let distance = imm32(delta.unsigned_abs())?;
        if delta >= 0 {
            self.buf.emit(&x86::add_rbx(distance));
        } else {
            self.buf.emit(&x86::sub_rbx(distance));
        }
        self.buf.emit(&x86::cmp_rbx(TAPE_SIZE as u32));
        self.branch(&x86::JAE_REL32, self.exit)
    }

    fn emit_op(&mut self, op: &Op) -> BfResult<()> {
        match *op {
            Op::MovePtrForward(n) => self.move_pointer(count(n)?)?,
            Op::MovePtrBackward(n) => self.move_pointer(-count(n)?)?,
            Op::AddData(n) => {
                let imm = n as u8;
                if imm != 0 {
                    self.buf.emit(&x86::add_cell(imm));
                }
            }
            Op::SubData(n) => {
                let imm = n as u8;
                if imm != 0 {
                    self.buf.emit(&x86::sub_cell(imm));
                }
            }
            Op::Write(n) => {
                let code = x86::cell_syscall(x86::SYS_WRITE, self.fds.output as u32);
                for _ in 0..n {
                    self.buf.emit(&code);
                }
            }
            Op::Read(n) => {
                let code = x86::cell_syscall(x86::SYS_READ, self.fds.input as u32);
                for _ in 0..n {
                    self.buf.emit(&code);
                }
            }
            Op::JumpIfZero(_) => {
                let end = self.new_label();
                self.buf.emit(&x86::CMP_CELL_ZERO);
                self.branch(&x86::JZ_REL32, end)?;
                let body = self.new_label();
                self.bind(body)?;
                self.open_loops.push((body, end));
            }
            Op::JumpIfNotZero(_) => {
                let (body, end) = self
                    .open_loops
                    .pop()
                    .ok_or_else(|| BfError::codegen("unmatched ']' in op stream"))?;
                self.buf.emit(&x86::CMP_CELL_ZERO);
                self.branch(&x86::JNZ_REL32, body)?;
                self.bind(end)?;
            }
            Op::SetZero => self.buf.emit(&x86::SET_CELL_ZERO),
            Op::ScanUntilZero(step) => {
                let head = self.new_label();
                let done = self.new_label();
                self.bind(head)?;
                self.buf.emit(&x86::CMP_CELL_ZERO);
                self.branch(&x86::JZ_REL32, done)?;
                self.move_pointer(step as i64)?;
                self.branch(&x86::JMP_REL32, head)?;
                self.bind(done)?;
            }
            Op::TransferAndZero(delta) => {
                let done = self.new_label();
                let distance = imm32((delta as i64).unsigned_abs())?;
                self.buf.emit(&x86::CMP_CELL_ZERO);
                self.branch(&x86::JZ_REL32, done)?;
                self.buf.emit(&x86::MOV_RCX_RBX);
                if delta >= 0 {
                    self.buf.emit(&x86::add_rcx(distance));
                } else {
                    self.buf.emit(&x86::sub_rcx(distance));
                }
                self.buf.emit(&x86::cmp_rcx(TAPE_SIZE as u32));
                self.branch(&x86::JAE_REL32, self.fault_rcx)?;
                self.buf.emit(&x86::MOV_AL_CELL);
                self.buf.emit(&x86::ADD_RCX_CELL_AL);
                self.buf.emit(&x86::SET_CELL_ZERO);
                self.bind(done)?;
            }
        }
        Ok(())
    }
}

fn count(n: usize) -> BfResult<i64> {
    i64::try_from(n).map_err(|_| BfError::codegen(format!("count {} too large", n)))
}

fn imm32(n: u64) -> BfResult<u32> {
    if n > i32::MAX as u64 {
        return Err(BfError::codegen(format!(
            "displacement {} does not fit in a 32-bit immediate",
            n
        )));
    }
    Ok(n as u32)
}

/// Generate x86-64 code for `stream`
///
/// # Example
///
/// ```
/// use bytecode_system::{compile, CompileOptions};
/// use core_types::RawProgram;
/// use jit_compiler::{generate_template_code, IoFds};
///
/// let stream = compile(&RawProgram::from_source("+"), &CompileOptions::default()).unwrap();
/// let code = generate_template_code(&stream, IoFds::default()).unwrap();
/// assert_eq!(code[0], 0x53); // push rbx
/// ```
pub fn generate_template_code(stream: &OpStream, fds: IoFds) -> BfResult<Vec<u8>> {
    TemplateCompiler::new(fds).compile(stream)
}

/// `Executor` running programs as template-generated x86-64 code
#[derive(Debug, Clone, Default)]
pub struct TemplateJit {
    options: CompileOptions,
    fds: IoFds,
    code: Option<Vec<u8>>,
}

impl TemplateJit {
    /// Create a JIT compiling with `options`
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            fds: IoFds::default(),
            code: None,
        }
    }

    /// Use `fds` instead of the standard streams
    pub fn with_fds(mut self, fds: IoFds) -> Self {
        self.fds = fds;
        self
    }

    /// Code generated by the last `prepare`
    pub fn code(&self) -> Option<&[u8]> {
        self.code.as_deref()
    }

    /// Generate (if needed) and run `program` on `tape`, returning the
    /// final data pointer
    pub fn run(&mut self, program: &RawProgram, tape: &mut MemoryTape) -> BfResult<usize> {
        if !TEMPLATE_JIT_SUPPORTED {
            return Err(BfError::codegen(
                "template JIT output only runs on x86-64 Linux",
            ));
        }
        if self.code.is_none() {
            self.prepare(program)?;
        }
        let code = self
            .code
            .as_deref()
            .ok_or_else(|| BfError::internal("template code missing after prepare"))?;
        run_native(code, tape)
    }
}

impl Executor for TemplateJit {
    fn name(&self) -> &'static str {
        "template-jit"
    }

    fn prepare(&mut self, program: &RawProgram) -> BfResult<()> {
        let stream = compile(program, &self.options)?;
        self.code = Some(generate_template_code(&stream, self.fds)?);
        Ok(())
    }

    fn execute(&mut self, program: &RawProgram) -> BfResult<()> {
        // Generated code writes straight to the fd; nothing buffered may
        // follow it out.
        io::stdout().flush()?;
        let mut tape = MemoryTape::new();
        self.run(program, &mut tape)?;
        Ok(())
    }
}

//! Cranelift-based JIT compiler backend
//!
//! Lowers an op stream to Cranelift IR for the host ISA. Loops become a
//! `body`/`after` block pair kept on a stack; pointer moves branch to a
//! shared exit block when the index leaves the tape; I/O calls the
//! `extern "C"` helpers in [`crate::io`] through their absolute addresses,
//! so the finished code carries no relocations and can be copied into the
//! executable memory arena as-is.

use std::io::{self, Write};

use bytecode_system::{compile, CompileOptions, Op, OpStream};
use core_types::{BfError, BfResult, Executor, RawProgram, TAPE_SIZE};
use cranelift_codegen::control::ControlPlane;
use cranelift_codegen::entity::EntityRef;
use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::{
    types, AbiParam, Block, Function, InstBuilder, MemFlags, SigRef, Signature, Type,
    UserFuncName, Value,
};
use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_codegen::settings::{self, Configurable};
use cranelift_codegen::Context;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext, Variable};
use interpreter::MemoryTape;
use tracing::debug;

use crate::io::{read_cell, write_cell, IoFds};
use crate::native::run_native;

/// Cranelift code generator for the host ISA
pub struct CraneliftCompiler {
    isa: OwnedTargetIsa,
    fds: IoFds,
}

impl std::fmt::Debug for CraneliftCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraneliftCompiler")
            .field("isa", &self.isa.name())
            .field("fds", &self.fds)
            .finish()
    }
}

impl CraneliftCompiler {
    /// Create a compiler for the host, using `fds` for I/O
    pub fn new(fds: IoFds) -> BfResult<Self> {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("opt_level", "speed")
            .map_err(|e| BfError::codegen(e.to_string()))?;
        flag_builder
            .set("is_pic", "false")
            .map_err(|e| BfError::codegen(e.to_string()))?;

        let isa_builder = cranelift_native::builder()
            .map_err(|e| BfError::codegen(format!("host ISA unavailable: {}", e)))?;
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| BfError::codegen(e.to_string()))?;

        Ok(Self { isa, fds })
    }

    /// Name of the target ISA
    pub fn isa_name(&self) -> &'static str {
        self.isa.name()
    }

    /// Build the IR function for `stream`
    pub fn build_function(&self, stream: &OpStream) -> BfResult<Function> {
        let ptr = self.isa.pointer_type();
        if ptr != types::I64 {
            return Err(BfError::codegen(format!(
                "64-bit target required, host pointer type is {}",
                ptr
            )));
        }
        let call_conv = self.isa.default_call_conv();

        let mut sig = Signature::new(call_conv);
        sig.params.push(AbiParam::new(ptr));
        sig.returns.push(AbiParam::new(ptr));
        let mut func = Function::with_name_signature(UserFuncName::user(0, 0), sig);

        // (fd, cell, count) -> ()
        let mut io_sig = Signature::new(call_conv);
        io_sig.params.push(AbiParam::new(types::I32));
        io_sig.params.push(AbiParam::new(ptr));
        io_sig.params.push(AbiParam::new(types::I64));

        let mut builder_ctx = FunctionBuilderContext::new();
        let mut builder = FunctionBuilder::new(&mut func, &mut builder_ctx);
        let io_sig = builder.import_signature(io_sig);

        let entry = builder.create_block();
        builder.append_block_params_for_function_params(entry);
        let exit = builder.create_block();
        builder.append_block_param(exit, ptr);

        builder.switch_to_block(entry);
        let tape = builder.block_params(entry)[0];
        let index = Variable::new(0);
        builder.declare_var(index, ptr);
        let zero = builder.ins().iconst(ptr, 0);
        builder.def_var(index, zero);

        let mut lowering = Lowering {
            builder,
            ptr,
            tape,
            index,
            exit,
            io_sig,
            fds: self.fds,
            loops: Vec::new(),
        };
        for op in stream {
            lowering.lower(op)?;
        }
        lowering.finish()?;

        Ok(func)
    }

    /// Compile `stream` to position-independent machine code
    pub fn compile(&self, stream: &OpStream) -> BfResult<Vec<u8>> {
        let func = self.build_function(stream)?;
        let mut ctx = Context::for_function(func);
        let compiled = ctx
            .compile(&*self.isa, &mut ControlPlane::default())
            .map_err(|e| BfError::codegen(e.inner.to_string()))?;

        if !compiled.buffer.relocs().is_empty() {
            return Err(BfError::codegen(format!(
                "generated code needs {} relocations",
                compiled.buffer.relocs().len()
            )));
        }
        let code = compiled.code_buffer().to_vec();
        debug!(
            ops = stream.len(),
            bytes = code.len(),
            isa = self.isa.name(),
            "generated cranelift code"
        );
        Ok(code)
    }
}

/// IR emission state for one function
struct Lowering<'a> {
    builder: FunctionBuilder<'a>,
    ptr: Type,
    tape: Value,
    index: Variable,
    exit: Block,
    io_sig: SigRef,
    fds: IoFds,
    /// `(body, after)` of every open loop
    loops: Vec<(Block, Block)>,
}

impl Lowering<'_> {
    fn cell_addr(&mut self) -> Value {
        let index = self.builder.use_var(self.index);
        self.builder.ins().iadd(self.tape, index)
    }

    fn load_cell(&mut self) -> Value {
        let addr = self.cell_addr();
        self.builder.ins().load(types::I8, MemFlags::trusted(), addr, 0)
    }

    fn store_cell(&mut self, value: Value) {
        let addr = self.cell_addr();
        self.builder.ins().store(MemFlags::trusted(), value, addr, 0);
    }

    fn byte(&mut self, n: usize) -> Value {
        self.builder.ins().iconst(types::I8, (n as u8) as i64)
    }

    /// Leave through `exit` with `index` unless it is on the tape
    fn check_bounds(&mut self, index: Value) {
        let out_of_range =
            self.builder
                .ins()
                .icmp_imm(IntCC::UnsignedGreaterThanOrEqual, index, TAPE_SIZE as i64);
        let in_range = self.builder.create_block();
        self.builder
            .ins()
            .brif(out_of_range, self.exit, &[index], in_range, &[]);
        self.builder.switch_to_block(in_range);
    }

    fn move_pointer(&mut self, delta: i64) {
        let index = self.builder.use_var(self.index);
        let moved = self.builder.ins().iadd_imm(index, delta);
        self.builder.def_var(self.index, moved);
        self.check_bounds(moved);
    }

    fn call_io(&mut self, helper: usize, fd: i32, count: usize) {
        let fd = self.builder.ins().iconst(types::I32, fd as i64);
        let cell = self.cell_addr();
        let count = self.builder.ins().iconst(types::I64, count as i64);
        let callee = self.builder.ins().iconst(self.ptr, helper as i64);
        self.builder
            .ins()
            .call_indirect(self.io_sig, callee, &[fd, cell, count]);
    }

    fn lower(&mut self, op: &Op) -> BfResult<()> {
        match *op {
            Op::MovePtrForward(n) => self.move_pointer(displacement(n)?),
            Op::MovePtrBackward(n) => self.move_pointer(-displacement(n)?),
            Op::AddData(n) => {
                let value = self.load_cell();
                let amount = self.byte(n);
                let sum = self.builder.ins().iadd(value, amount);
                self.store_cell(sum);
            }
            Op::SubData(n) => {
                let value = self.load_cell();
                let amount = self.byte(n);
                let difference = self.builder.ins().isub(value, amount);
                self.store_cell(difference);
            }
            Op::Write(n) => {
                self.call_io(write_cell as *const () as usize, self.fds.output, n)
            }
            Op::Read(n) => self.call_io(read_cell as *const () as usize, self.fds.input, n),
            Op::JumpIfZero(_) => {
                let body = self.builder.create_block();
                let after = self.builder.create_block();
                let value = self.load_cell();
                self.builder.ins().brif(value, body, &[], after, &[]);
                self.builder.switch_to_block(body);
                self.loops.push((body, after));
            }
            Op::JumpIfNotZero(_) => {
                let (body, after) = self
                    .loops
                    .pop()
                    .ok_or_else(|| BfError::codegen("unmatched ']' in op stream"))?;
                let value = self.load_cell();
                self.builder.ins().brif(value, body, &[], after, &[]);
                self.builder.switch_to_block(after);
            }
            Op::SetZero => {
                let zero = self.byte(0);
                self.store_cell(zero);
            }
            Op::ScanUntilZero(step) => {
                let step = displacement(step)?;
                let head = self.builder.create_block();
                let advance = self.builder.create_block();
                let done = self.builder.create_block();
                self.builder.ins().jump(head, &[]);

                self.builder.switch_to_block(head);
                let value = self.load_cell();
                self.builder.ins().brif(value, advance, &[], done, &[]);

                self.builder.switch_to_block(advance);
                self.move_pointer(step);
                self.builder.ins().jump(head, &[]);

                self.builder.switch_to_block(done);
            }
            Op::TransferAndZero(delta) => {
                let delta = displacement(delta)?;
                let transfer = self.builder.create_block();
                let done = self.builder.create_block();
                let value = self.load_cell();
                self.builder.ins().brif(value, transfer, &[], done, &[]);

                self.builder.switch_to_block(transfer);
                let index = self.builder.use_var(self.index);
                let target = self.builder.ins().iadd_imm(index, delta);
                self.check_bounds(target);
                let target_addr = self.builder.ins().iadd(self.tape, target);
                let old = self
                    .builder
                    .ins()
                    .load(types::I8, MemFlags::trusted(), target_addr, 0);
                let sum = self.builder.ins().iadd(old, value);
                self.builder
                    .ins()
                    .store(MemFlags::trusted(), sum, target_addr, 0);
                let zero = self.byte(0);
                self.store_cell(zero);
                self.builder.ins().jump(done, &[]);

                self.builder.switch_to_block(done);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> BfResult<()> {
        if !self.loops.is_empty() {
            return Err(BfError::codegen(format!(
                "{} loops left open in op stream",
                self.loops.len()
            )));
        }
        let index = self.builder.use_var(self.index);
        self.builder.ins().jump(self.exit, &[index]);

        self.builder.switch_to_block(self.exit);
        let result = self.builder.block_params(self.exit)[0];
        self.builder.ins().return_(&[result]);

        self.builder.seal_all_blocks();
        self.builder.finalize();
        Ok(())
    }
}

fn displacement<T>(n: T) -> BfResult<i64>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    n.try_into().map(i64::from).map_err(|_| {
        BfError::codegen(format!("displacement {} does not fit in 32 bits", n))
    })
}

/// `Executor` running programs as Cranelift-generated code
#[derive(Debug)]
pub struct CraneliftJit {
    options: CompileOptions,
    fds: IoFds,
    code: Option<Vec<u8>>,
}

impl CraneliftJit {
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
        if self.code.is_none() {
            self.prepare(program)?;
        }
        let code = self
            .code
            .as_deref()
            .ok_or_else(|| BfError::internal("cranelift code missing after prepare"))?;
        run_native(code, tape)
    }
}

impl Default for CraneliftJit {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl Executor for CraneliftJit {
    fn name(&self) -> &'static str {
        "cranelift-jit"
    }

    fn prepare(&mut self, program: &RawProgram) -> BfResult<()> {
        let stream = compile(program, &self.options)?;
        let compiler = CraneliftCompiler::new(self.fds)?;
        self.code = Some(compiler.compile(&stream)?);
        Ok(())
    }

    fn execute(&mut self, program: &RawProgram) -> BfResult<()> {
        io::stdout().flush()?;
        let mut tape = MemoryTape::new();
        self.run(program, &mut tape)?;
        Ok(())
    }
}

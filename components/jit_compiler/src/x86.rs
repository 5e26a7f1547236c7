//! x86-64 instruction templates for the template JIT
//!
//! Pure data: every function here only assembles bytes, it never looks at
//! the op stream. Register roles are fixed:
//! - `r13`: tape base address
//! - `rbx`: data index
//! - `rcx`, `rax`: scratch
//!
//! `rbx` and `r13` are callee-saved, so they survive the `syscall`s used for
//! I/O (which clobber `rcx` and `r11`).

/// Linux `read` syscall number
pub const SYS_READ: u32 = 0;
/// Linux `write` syscall number
pub const SYS_WRITE: u32 = 1;

/// `push rbx; push r13; mov r13, rdi; xor ebx, ebx`
pub const PROLOGUE: [u8; 8] = [
    0x53, // push rbx
    0x41, 0x55, // push r13
    0x49, 0x89, 0xFD, // mov r13, rdi
    0x31, 0xDB, // xor ebx, ebx
];

/// `mov rax, rbx; pop r13; pop rbx; ret`
pub const EPILOGUE: [u8; 7] = [
    0x48, 0x89, 0xD8, // mov rax, rbx
    0x41, 0x5D, // pop r13
    0x5B, // pop rbx
    0xC3, // ret
];

/// `cmp byte [rbx+r13], 0`
pub const CMP_CELL_ZERO: [u8; 5] = [0x42, 0x80, 0x3C, 0x2B, 0x00];

/// `mov byte [rbx+r13], 0`
pub const SET_CELL_ZERO: [u8; 5] = [0x42, 0xC6, 0x04, 0x2B, 0x00];

/// `lea rsi, [rbx+r13]`
pub const LEA_RSI_CELL: [u8; 4] = [0x4A, 0x8D, 0x34, 0x2B];

/// `mov al, [rbx+r13]`
pub const MOV_AL_CELL: [u8; 4] = [0x42, 0x8A, 0x04, 0x2B];

/// `add [rcx+r13], al`
pub const ADD_RCX_CELL_AL: [u8; 4] = [0x42, 0x00, 0x04, 0x29];

/// `mov rcx, rbx`
pub const MOV_RCX_RBX: [u8; 3] = [0x48, 0x89, 0xD9];

/// `mov rbx, rcx`
pub const MOV_RBX_RCX: [u8; 3] = [0x48, 0x89, 0xCB];

/// `syscall`
pub const SYSCALL: [u8; 2] = [0x0F, 0x05];

/// `jz rel32` opcode
pub const JZ_REL32: [u8; 2] = [0x0F, 0x84];
/// `jnz rel32` opcode
pub const JNZ_REL32: [u8; 2] = [0x0F, 0x85];
/// `jae rel32` opcode
pub const JAE_REL32: [u8; 2] = [0x0F, 0x83];
/// `jmp rel32` opcode
pub const JMP_REL32: [u8; 1] = [0xE9];

/// `add byte [rbx+r13], imm8`
pub const fn add_cell(imm: u8) -> [u8; 5] {
    [0x42, 0x80, 0x04, 0x2B, imm]
}

/// `sub byte [rbx+r13], imm8`
pub const fn sub_cell(imm: u8) -> [u8; 5] {
    [0x42, 0x80, 0x2C, 0x2B, imm]
}

const fn rex_w_81(modrm: u8, imm: u32) -> [u8; 7] {
    let b = imm.to_le_bytes();
    [0x48, 0x81, modrm, b[0], b[1], b[2], b[3]]
}

/// `add rbx, imm32`
pub const fn add_rbx(imm: u32) -> [u8; 7] {
    rex_w_81(0xC3, imm)
}

/// `sub rbx, imm32`
pub const fn sub_rbx(imm: u32) -> [u8; 7] {
    rex_w_81(0xEB, imm)
}

/// `cmp rbx, imm32`
pub const fn cmp_rbx(imm: u32) -> [u8; 7] {
    rex_w_81(0xFB, imm)
}

/// `add rcx, imm32`
pub const fn add_rcx(imm: u32) -> [u8; 7] {
    rex_w_81(0xC1, imm)
}

/// `sub rcx, imm32`
pub const fn sub_rcx(imm: u32) -> [u8; 7] {
    rex_w_81(0xE9, imm)
}

/// `cmp rcx, imm32`
pub const fn cmp_rcx(imm: u32) -> [u8; 7] {
    rex_w_81(0xF9, imm)
}

/// One-byte `read`/`write` on the current cell:
/// `mov eax, number; mov edi, fd; lea rsi, [rbx+r13]; mov edx, 1; syscall`
pub fn cell_syscall(number: u32, fd: u32) -> Vec<u8> {
    let mut code = Vec::with_capacity(21);
    code.push(0xB8);
    code.extend_from_slice(&number.to_le_bytes());
    code.push(0xBF);
    code.extend_from_slice(&fd.to_le_bytes());
    code.extend_from_slice(&LEA_RSI_CELL);
    code.push(0xBA);
    code.extend_from_slice(&1u32.to_le_bytes());
    code.extend_from_slice(&SYSCALL);
    code
}

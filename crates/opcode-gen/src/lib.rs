//! Fixed opcode sequences for dumping and disassembly.
//!
//! [`generate_opcodes`] emits the same instruction stream for the same inputs every time.
//! The stream always starts with `ret` so a host-matching buffer can be called directly;
//! nothing after the `ret` is ever executed.
//!
//! Instructions are grouped by category: general purpose, shifts, bit ops, stack, memory
//! forms, misc and SSE.
//!
//! `use_rex1` moves the first operand group to `r8`/`r8d`/`r8b`/`xmm8`; `use_rex2` moves the
//! second operand group (and the memory base/index) to `r9`/`r10`/`r11`/`xmm9`. Between them
//! the 64-bit dump covers the REX.R / REX.B / REX.X encodings. In 32-bit mode those registers
//! do not exist and the emitter reports each affected instruction instead.

use opcode_emit::x86::{Code, MemoryOperand, Operand, Register, X86Emitter};

/// Emits the full opcode dump sequence into `e`.
pub fn generate_opcodes(e: &mut dyn X86Emitter, use_rex1: bool, use_rex2: bool) {
    let r = Regs::select(e.is_64bit(), use_rex1, use_rex2);

    e.emit(r.pick(Code::Retnd, Code::Retnq), &[]);

    gp_base(e, &r);
    gp_arith(e, &r);
    gp_shift(e, &r);
    gp_bits(e, &r);
    gp_stack(e, &r);
    gp_mem(e, &r);
    misc(e, &r);
    sse(e, &r);
}

/// Number of instructions [`generate_opcodes`] requests, whether or not they encode.
pub fn opcode_count() -> usize {
    1 + GP_BASE + GP_ARITH + GP_SHIFT + GP_BITS + GP_STACK + GP_MEM + MISC + SSE
}

struct Regs {
    is_64bit: bool,
    /// Native-width first/second operands (`rax`/`rcx` or `eax`/`ecx`).
    ga: Register,
    gb: Register,
    /// 32-bit views, used in both modes.
    da: Register,
    db: Register,
    /// 8-bit view of the first operand.
    ba: Register,
    base: Register,
    index: Register,
    xa: Register,
    xb: Register,
}

impl Regs {
    fn select(is_64bit: bool, use_rex1: bool, use_rex2: bool) -> Self {
        let (da, ba, xa) = if use_rex1 {
            (Register::R8D, Register::R8L, Register::XMM8)
        } else {
            (Register::EAX, Register::AL, Register::XMM0)
        };
        let (db, xb) = if use_rex2 {
            (Register::R9D, Register::XMM9)
        } else {
            (Register::ECX, Register::XMM1)
        };

        let (ga, gb, base, index) = match (is_64bit, use_rex1, use_rex2) {
            (true, a, b) => (
                if a { Register::R8 } else { Register::RAX },
                if b { Register::R9 } else { Register::RCX },
                if b { Register::R10 } else { Register::RBX },
                if b { Register::R11 } else { Register::RSI },
            ),
            (false, _, b) => (
                da,
                db,
                if b { Register::R10D } else { Register::EBX },
                if b { Register::R11D } else { Register::ESI },
            ),
        };

        Self {
            is_64bit,
            ga,
            gb,
            da,
            db,
            ba,
            base,
            index,
            xa,
            xb,
        }
    }

    fn pick(&self, code32: Code, code64: Code) -> Code {
        if self.is_64bit {
            code64
        } else {
            code32
        }
    }

    /// 32-bit operand pair for the dword forms. In 32-bit mode the native pair is already
    /// 32-bit, so the operands are swapped to keep each request distinct.
    fn dword_pair(&self) -> (Register, Register) {
        if self.is_64bit {
            (self.da, self.db)
        } else {
            (self.db, self.da)
        }
    }

    fn mem(&self, displ: i64) -> MemoryOperand {
        MemoryOperand::with_base_displ(self.base, displ)
    }

    fn mem_indexed(&self, scale: u32) -> MemoryOperand {
        MemoryOperand::with_base_index_scale(self.base, self.index, scale)
    }
}

fn rr(a: Register, b: Register) -> [Operand; 2] {
    [a.into(), b.into()]
}

/// `(32-bit form, 64-bit form)` of one mnemonic.
type Forms = (Code, Code);

/// Emits each form with the native-width `ga, gb` pair.
fn binary(e: &mut dyn X86Emitter, r: &Regs, forms: &[Forms]) {
    for &(code32, code64) in forms {
        e.emit(r.pick(code32, code64), &rr(r.ga, r.gb));
    }
}

/// Emits each form with `ga` as the only operand.
fn unary(e: &mut dyn X86Emitter, r: &Regs, forms: &[Forms]) {
    for &(code32, code64) in forms {
        e.emit(r.pick(code32, code64), &[r.ga.into()]);
    }
}

fn bare(e: &mut dyn X86Emitter, codes: &[Code]) {
    for &code in codes {
        e.emit(code, &[]);
    }
}

const GP_BASE: usize = 11;

const TEST_XCHG: [Forms; 2] = [
    (Code::Test_rm32_r32, Code::Test_rm64_r64),
    (Code::Xchg_rm32_r32, Code::Xchg_rm64_r64),
];

fn gp_base(e: &mut dyn X86Emitter, r: &Regs) {
    let (da, db) = r.dword_pair();

    binary(e, r, &[(Code::Cmove_r32_rm32, Code::Cmove_r64_rm64)]);
    e.emit(Code::Mov_r32_rm32, &rr(da, db));
    binary(e, r, &[(Code::Mov_r32_rm32, Code::Mov_r64_rm64)]);
    let mov_imm = r.pick(Code::Mov_rm32_imm32, Code::Mov_rm64_imm32);
    e.emit(mov_imm, &[r.ga.into(), 0x1234_5678.into()]);
    e.emit(Code::Movzx_r32_rm8, &rr(r.da, r.ba));
    e.emit(Code::Sete_rm8, &[r.ba.into()]);
    binary(e, r, &TEST_XCHG);
    bare(e, &[Code::Clc, Code::Cmc, Code::Stc]);
}

const GP_ARITH: usize = 16;

const ARITH_HEAD: [Forms; 2] = [
    (Code::Adc_r32_rm32, Code::Adc_r64_rm64),
    (Code::Add_r32_rm32, Code::Add_r64_rm64),
];

const ARITH_TAIL: [Forms; 4] = [
    (Code::Or_r32_rm32, Code::Or_r64_rm64),
    (Code::Sbb_r32_rm32, Code::Sbb_r64_rm64),
    (Code::Sub_r32_rm32, Code::Sub_r64_rm64),
    (Code::Xor_r32_rm32, Code::Xor_r64_rm64),
];

const INC_NEG_NOT: [Forms; 3] = [
    (Code::Inc_rm32, Code::Inc_rm64),
    (Code::Neg_rm32, Code::Neg_rm64),
    (Code::Not_rm32, Code::Not_rm64),
];

fn gp_arith(e: &mut dyn X86Emitter, r: &Regs) {
    let (da, db) = r.dword_pair();

    binary(e, r, &ARITH_HEAD);
    let add_imm = r.pick(Code::Add_rm32_imm32, Code::Add_rm64_imm32);
    e.emit(add_imm, &[r.ga.into(), 0x100.into()]);
    e.emit(Code::Add_r32_rm32, &rr(da, db));
    binary(e, r, &[(Code::And_r32_rm32, Code::And_r64_rm64)]);
    binary(e, r, &[(Code::Cmp_r32_rm32, Code::Cmp_r64_rm64)]);
    let cmp_imm = r.pick(Code::Cmp_rm32_imm32, Code::Cmp_rm64_imm32);
    e.emit(cmp_imm, &[r.ga.into(), (-1).into()]);
    unary(e, r, &[(Code::Dec_rm32, Code::Dec_rm64)]);
    binary(e, r, &[(Code::Imul_r32_rm32, Code::Imul_r64_rm64)]);
    unary(e, r, &INC_NEG_NOT);
    binary(e, r, &ARITH_TAIL);
}

const GP_SHIFT: usize = 6;

const ROTATES: [Forms; 3] = [
    (Code::Rol_rm32_imm8, Code::Rol_rm64_imm8),
    (Code::Ror_rm32_imm8, Code::Ror_rm64_imm8),
    (Code::Sar_rm32_imm8, Code::Sar_rm64_imm8),
];

const SHIFTS: [Forms; 2] = [
    (Code::Shl_rm32_imm8, Code::Shl_rm64_imm8),
    (Code::Shr_rm32_imm8, Code::Shr_rm64_imm8),
];

/// Emits each form as `ga, imm8`, counting up from `first`.
fn by_imm(e: &mut dyn X86Emitter, r: &Regs, forms: &[Forms], first: i32) {
    for (count, &(code32, code64)) in (first..).zip(forms) {
        e.emit(r.pick(code32, code64), &[r.ga.into(), count.into()]);
    }
}

fn gp_shift(e: &mut dyn X86Emitter, r: &Regs) {
    by_imm(e, r, &ROTATES, 1);
    let shl_cl = r.pick(Code::Shl_rm32_CL, Code::Shl_rm64_CL);
    e.emit(shl_cl, &rr(r.ga, Register::CL));
    by_imm(e, r, &SHIFTS, 4);
}

const GP_BITS: usize = 5;

const BIT_SCANS: [Forms; 2] = [
    (Code::Bsf_r32_rm32, Code::Bsf_r64_rm64),
    (Code::Bsr_r32_rm32, Code::Bsr_r64_rm64),
];

const BIT_TESTS: [Forms; 2] = [
    (Code::Bt_rm32_r32, Code::Bt_rm64_r64),
    (Code::Bts_rm32_r32, Code::Bts_rm64_r64),
];

fn gp_bits(e: &mut dyn X86Emitter, r: &Regs) {
    binary(e, r, &BIT_SCANS);
    unary(e, r, &[(Code::Bswap_r32, Code::Bswap_r64)]);
    binary(e, r, &BIT_TESTS);
}

const GP_STACK: usize = 4;

fn gp_stack(e: &mut dyn X86Emitter, r: &Regs) {
    let pop = r.pick(Code::Pop_r32, Code::Pop_r64);
    let push = r.pick(Code::Push_r32, Code::Push_r64);
    e.emit(pop, &[r.ga.into()]);
    e.emit(pop, &[r.gb.into()]);
    e.emit(push, &[r.ga.into()]);
    e.emit(push, &[r.gb.into()]);
}

const GP_MEM: usize = 7;

fn gp_mem(e: &mut dyn X86Emitter, r: &Regs) {
    let add_store = r.pick(Code::Add_rm32_r32, Code::Add_rm64_r64);
    let lea = r.pick(Code::Lea_r32_m, Code::Lea_r64_m);
    let load = r.pick(Code::Mov_r32_rm32, Code::Mov_r64_rm64);
    let store_imm = r.pick(Code::Mov_rm32_imm32, Code::Mov_rm64_imm32);
    let store = r.pick(Code::Mov_rm32_r32, Code::Mov_rm64_r64);

    e.emit(add_store, &[r.mem(0).into(), r.ga.into()]);
    e.emit(lea, &[r.ga.into(), r.mem_indexed(4).into()]);
    e.emit(lea, &[r.ga.into(), r.mem(-128).into()]);
    e.emit(load, &[r.ga.into(), r.mem(64).into()]);
    e.emit(load, &[r.ga.into(), r.mem_indexed(8).into()]);
    e.emit(store_imm, &[r.mem(0x1000).into(), 0.into()]);
    e.emit(store, &[r.mem(8).into(), r.gb.into()]);
}

const MISC: usize = 10;

const MISC_TAIL: [Code; 9] = [
    Code::Cpuid,
    Code::Int3,
    Code::Lfence,
    Code::Mfence,
    Code::Nopd,
    Code::Pause,
    Code::Rdtsc,
    Code::Sfence,
    Code::Ud2,
];

fn misc(e: &mut dyn X86Emitter, r: &Regs) {
    e.emit(r.pick(Code::Cdq, Code::Cqo), &[]);
    bare(e, &MISC_TAIL);
}

const SSE: usize = 12;

fn packed(e: &mut dyn X86Emitter, r: &Regs, code: Code) {
    e.emit(code, &rr(r.xa, r.xb));
}

fn sse(e: &mut dyn X86Emitter, r: &Regs) {
    let cvtsi2ss = r.pick(Code::Cvtsi2ss_xmm_rm32, Code::Cvtsi2ss_xmm_rm64);

    packed(e, r, Code::Addps_xmm_xmmm128);
    packed(e, r, Code::Addss_xmm_xmmm32);
    e.emit(Code::Addps_xmm_xmmm128, &[r.xa.into(), r.mem(16).into()]);
    e.emit(cvtsi2ss, &rr(r.xa, r.gb));
    packed(e, r, Code::Movaps_xmm_xmmm128);
    e.emit(Code::Movd_xmm_rm32, &rr(r.xa, r.db));
    packed(e, r, Code::Mulps_xmm_xmmm128);
    packed(e, r, Code::Paddd_xmm_xmmm128);
    packed(e, r, Code::Pxor_xmm_xmmm128);
    packed(e, r, Code::Sqrtps_xmm_xmmm128);
    packed(e, r, Code::Subps_xmm_xmmm128);
    packed(e, r, Code::Xorps_xmm_xmmm128);
}

//! x86/x86-64 assembler on top of the `iced-x86` encoder.

mod assembler;
mod operand;

pub use assembler::Assembler;
pub use iced_x86::{Code, MemoryOperand, Register};
pub use operand::Operand;

use crate::Arch;

/// Instruction-emission capability handed to opcode generators.
///
/// Emission is infallible from the caller's point of view: faults are routed to
/// the session's error handler and the instruction is skipped.
pub trait X86Emitter {
    fn arch(&self) -> Arch;

    fn is_64bit(&self) -> bool {
        self.arch() == Arch::X64
    }

    /// Current write offset into the session's code buffer.
    fn offset(&self) -> usize;

    fn emit(&mut self, code: Code, operands: &[Operand]);
}

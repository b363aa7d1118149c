use iced_x86::{Code, Instruction, MemoryOperand, Register};

use crate::EmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Register),
    Imm(i32),
    Mem(MemoryOperand),
}

impl From<Register> for Operand {
    fn from(reg: Register) -> Self {
        Operand::Reg(reg)
    }
}

impl From<i32> for Operand {
    fn from(imm: i32) -> Self {
        Operand::Imm(imm)
    }
}

impl From<MemoryOperand> for Operand {
    fn from(mem: MemoryOperand) -> Self {
        Operand::Mem(mem)
    }
}

/// Builds an iced `Instruction` for `code` from up to two operands.
pub(crate) fn build_instruction(
    code: Code,
    operands: &[Operand],
) -> Result<Instruction, EmitError> {
    use Operand::{Imm, Mem, Reg};

    let built = match *operands {
        [] => Ok(Instruction::with(code)),
        [Reg(a)] => Instruction::with1(code, a),
        [Imm(a)] => Instruction::with1(code, a),
        [Mem(a)] => Instruction::with1(code, a),
        [Reg(a), Reg(b)] => Instruction::with2(code, a, b),
        [Reg(a), Imm(b)] => Instruction::with2(code, a, b),
        [Reg(a), Mem(b)] => Instruction::with2(code, a, b),
        [Mem(a), Reg(b)] => Instruction::with2(code, a, b),
        [Mem(a), Imm(b)] => Instruction::with2(code, a, b),
        _ => {
            return Err(EmitError::InvalidOperands {
                code,
                reason: format!("unsupported operand combination {operands:?}"),
            })
        }
    };

    built.map_err(|err| EmitError::InvalidOperands {
        code,
        reason: err.to_string(),
    })
}

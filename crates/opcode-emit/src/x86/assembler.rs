use iced_x86::{Code, Encoder, Formatter, IntelFormatter};

use super::operand::{build_instruction, Operand};
use super::X86Emitter;
use crate::{Arch, CodeHolder, EmitError};

/// x86/x86-64 assembler attached to a [`CodeHolder`].
///
/// Every instruction is encoded at the current end of the holder's buffer. Faults
/// are reported through [`CodeHolder::report_error`] and leave the buffer untouched.
pub struct Assembler<'c, 'h> {
    code: &'c mut CodeHolder<'h>,
    encoder: Option<Encoder>,
    formatter: IntelFormatter,
    text: String,
}

impl<'c, 'h> Assembler<'c, 'h> {
    pub fn new(code: &'c mut CodeHolder<'h>) -> Self {
        let encoder = code.arch().bitness().map(Encoder::new);
        Self {
            code,
            encoder,
            formatter: IntelFormatter::new(),
            text: String::new(),
        }
    }

    /// Narrows the assembler to the emission capability used by opcode generators.
    pub fn as_x86(&mut self) -> &mut dyn X86Emitter {
        self
    }

    pub fn code(&self) -> &CodeHolder<'h> {
        self.code
    }

    fn try_emit(&mut self, code: Code, operands: &[Operand]) -> Result<(), EmitError> {
        if !self.code.is_initialized() {
            return Err(EmitError::NotInitialized);
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(EmitError::UnsupportedArch(self.code.arch()));
        };

        let instr = build_instruction(code, operands)?;
        let ip = self.code.code_size() as u64;
        if let Err(err) = encoder.encode(&instr, ip) {
            // Drop whatever the encoder buffered before it gave up.
            let _ = encoder.take_buffer();
            return Err(EmitError::Encode {
                code,
                reason: err.to_string(),
            });
        }
        let bytes = encoder.take_buffer();

        if let Some(logger) = self.code.logger_mut() {
            self.text.clear();
            self.formatter.format(&instr, &mut self.text);
            if let Err(err) = logger.log_instruction(&self.text, &bytes) {
                tracing::warn!("failed to log instruction: {err}");
            }
        }

        self.code.append(&bytes);
        Ok(())
    }
}

impl X86Emitter for Assembler<'_, '_> {
    fn arch(&self) -> Arch {
        self.code.arch()
    }

    fn offset(&self) -> usize {
        self.code.code_size()
    }

    fn emit(&mut self, code: Code, operands: &[Operand]) {
        if let Err(err) = self.try_emit(code, operands) {
            tracing::trace!(?code, "instruction skipped: {err}");
            self.code.report_error(&err);
        }
    }
}

use iced_x86::Code;
use thiserror::Error;

use crate::{Arch, CodeHolder};

pub type Result<T> = std::result::Result<T, EmitError>;

/// Numeric error code handed to [`ErrorHandler`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidArch = 3,
    InvalidOperands = 4,
    InvalidInstruction = 5,
}

impl ErrorCode {
    pub fn value(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("code holder is not initialized")]
    NotInitialized,

    #[error("code holder is already initialized for {0}")]
    AlreadyInitialized(Arch),

    #[error("invalid architecture {0}")]
    InvalidArch(Arch),

    #[error("x86 assembler cannot emit for architecture {0}")]
    UnsupportedArch(Arch),

    #[error("invalid operands for {code:?}: {reason}")]
    InvalidOperands { code: Code, reason: String },

    #[error("cannot encode {code:?}: {reason}")]
    Encode { code: Code, reason: String },
}

impl EmitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EmitError::NotInitialized => ErrorCode::NotInitialized,
            EmitError::AlreadyInitialized(_) => ErrorCode::AlreadyInitialized,
            EmitError::InvalidArch(_) | EmitError::UnsupportedArch(_) => ErrorCode::InvalidArch,
            EmitError::InvalidOperands { .. } => ErrorCode::InvalidOperands,
            EmitError::Encode { .. } => ErrorCode::InvalidInstruction,
        }
    }
}

/// Observer for emission faults.
///
/// Called synchronously from inside emission; implementations must not panic and
/// cannot influence the emitter, which skips the faulting instruction and carries on.
pub trait ErrorHandler {
    fn handle_error(&self, code: ErrorCode, message: &str, origin: &CodeHolder<'_>);
}

impl<F> ErrorHandler for F
where
    F: Fn(ErrorCode, &str, &CodeHolder<'_>),
{
    fn handle_error(&self, code: ErrorCode, message: &str, origin: &CodeHolder<'_>) {
        self(code, message, origin)
    }
}

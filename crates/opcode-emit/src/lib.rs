//! Machine-code emission model used by the opcode dump harness.
//!
//! The pieces mirror a classic code-holder design:
//! - [`CodeHolder`]: one emission session, owning the code buffer for a single [`Arch`].
//! - [`ErrorHandler`]: observer invoked for every invalid or unencodable request.
//! - [`Logger`] / [`FileLogger`]: optional text + machine-code dump of every emitted instruction.
//! - [`x86::Assembler`]: attaches to a holder and exposes the [`x86::X86Emitter`] capability.
//!
//! Encoding is done by `iced-x86`; faults never abort emission. The faulting instruction is
//! skipped and the fault is routed to the holder's error handler.

mod arch;
mod code;
mod error;
mod logger;
pub mod x86;

pub use arch::{arch_id_to_str, Arch};
pub use code::CodeHolder;
pub use error::{EmitError, ErrorCode, ErrorHandler};
pub use logger::{FileLogger, FormatFlags, Logger};

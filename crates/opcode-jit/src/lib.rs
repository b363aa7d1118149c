//! Executable memory for generated machine code.
//!
//! [`ExecAllocator`] is the seam the opcode harness calls through; [`JitRuntime`] is the real
//! implementation. On Unix hosts it maps anonymous pages read/write, copies the code in, then
//! flips the pages to read/execute. Other hosts get a runtime that refuses every request.

mod error;
mod runtime;

pub use error::JitError;
pub use runtime::{ExecutableCode, JitRuntime};

/// A mapped, callable code region.
pub trait JitFunction {
    /// Calls the region as `extern "C" fn()`.
    ///
    /// # Safety
    ///
    /// The mapped bytes must be valid machine code for the host that returns to its caller
    /// without clobbering callee-saved state.
    unsafe fn call(&self);
}

pub trait ExecAllocator {
    type Code: JitFunction;

    fn map_executable(&mut self, code: &[u8]) -> Result<Self::Code, JitError>;
}

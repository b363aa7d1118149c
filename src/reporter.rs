use std::cell::Cell;
use std::io::Write;

use opcode_emit::{CodeHolder, ErrorCode, ErrorHandler};

use crate::SharedOutput;

/// Prints every emission fault as `ERROR 0x{code:08X}: {message}`.
///
/// Purely observational: it never fails and never touches the emitter.
pub struct ErrorReporter<W> {
    out: SharedOutput<W>,
    reported: Cell<usize>,
}

impl<W: Write> ErrorReporter<W> {
    pub fn new(out: SharedOutput<W>) -> Self {
        Self {
            out,
            reported: Cell::new(0),
        }
    }

    /// Number of faults reported so far.
    pub fn reported(&self) -> usize {
        self.reported.get()
    }
}

impl<W: Write> ErrorHandler for ErrorReporter<W> {
    fn handle_error(&self, code: ErrorCode, message: &str, origin: &CodeHolder<'_>) {
        self.reported.set(self.reported.get() + 1);
        tracing::debug!(
            arch = %origin.arch(),
            offset = origin.code_size(),
            code = code.value(),
            "emission fault"
        );
        if let Err(err) = self
            .out
            .write_line(format_args!("ERROR 0x{:08X}: {message}", code.value()))
        {
            tracing::warn!("failed to write error report: {err}");
        }
    }
}

use crate::error::Result;
use crate::{Arch, EmitError, ErrorHandler, Logger};

/// One emission session: the code buffer for a single architecture plus the
/// observers attached to it.
///
/// `'h` ties the error handler and logger to the session; both must outlive it.
pub struct CodeHolder<'h> {
    arch: Arch,
    buffer: Vec<u8>,
    error_handler: Option<&'h dyn ErrorHandler>,
    logger: Option<&'h mut dyn Logger>,
}

impl<'h> CodeHolder<'h> {
    pub fn new() -> Self {
        Self {
            arch: Arch::None,
            buffer: Vec::new(),
            error_handler: None,
            logger: None,
        }
    }

    pub fn init(&mut self, arch: Arch) -> Result<()> {
        if self.is_initialized() {
            return Err(EmitError::AlreadyInitialized(self.arch));
        }
        if arch == Arch::None {
            return Err(EmitError::InvalidArch(arch));
        }
        self.arch = arch;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.arch != Arch::None
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn set_error_handler(&mut self, handler: &'h dyn ErrorHandler) {
        self.error_handler = Some(handler);
    }

    pub fn reset_error_handler(&mut self) {
        self.error_handler = None;
    }

    pub fn error_handler(&self) -> Option<&'h dyn ErrorHandler> {
        self.error_handler
    }

    pub fn set_logger(&mut self, logger: &'h mut dyn Logger) {
        self.logger = Some(logger);
    }

    pub fn reset_logger(&mut self) {
        self.logger = None;
    }

    pub fn has_logger(&self) -> bool {
        self.logger.is_some()
    }

    pub(crate) fn logger_mut(&mut self) -> Option<&mut (dyn Logger + 'h)> {
        self.logger.as_deref_mut()
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn code_size(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Routes `err` to the attached error handler, or to `tracing` when none is attached.
    pub fn report_error(&self, err: &EmitError) {
        let message = err.to_string();
        match self.error_handler {
            Some(handler) => handler.handle_error(err.code(), &message, self),
            None => tracing::warn!(arch = %self.arch, code = err.code().value(), "{message}"),
        }
    }

    /// Ends the session, handing the emitted bytes to the caller.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for CodeHolder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

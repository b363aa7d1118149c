#[cfg(unix)]
mod host;

#[cfg(unix)]
pub use host::{ExecutableCode, JitRuntime};

#[cfg(not(unix))]
pub use fallback::{ExecutableCode, JitRuntime};

#[cfg(not(unix))]
mod fallback {
    use crate::{ExecAllocator, JitError, JitFunction};

    /// Executable mappings are never produced on this host.
    pub enum ExecutableCode {}

    impl JitFunction for ExecutableCode {
        unsafe fn call(&self) {
            match *self {}
        }
    }

    #[derive(Debug, Default)]
    pub struct JitRuntime {
        _priv: (),
    }

    impl JitRuntime {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mapped_count(&self) -> usize {
            0
        }
    }

    impl ExecAllocator for JitRuntime {
        type Code = ExecutableCode;

        fn map_executable(&mut self, _code: &[u8]) -> Result<ExecutableCode, JitError> {
            Err(JitError::Unsupported(
                "executable mappings require a unix host",
            ))
        }
    }
}

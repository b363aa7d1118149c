use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JitError {
    #[error("refusing to map an empty code buffer")]
    EmptyCode,

    #[error("code buffer of {len} bytes is too large to map")]
    TooLarge { len: usize },

    #[error("mmap of {len} bytes failed: {source}")]
    Map { len: usize, source: io::Error },

    #[error("mprotect(PROT_READ | PROT_EXEC) failed: {source}")]
    Protect { source: io::Error },

    #[error("executable memory is unavailable: {0}")]
    Unsupported(&'static str),
}

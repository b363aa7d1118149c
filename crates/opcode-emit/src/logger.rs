use std::fmt::Write as _;
use std::io::{self, Write};

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct FormatFlags: u32 {
        /// Append the encoded bytes (upper-case hex) after each instruction.
        const MACHINE_CODE = 1 << 0;
    }
}

/// Column the machine-code comment is aligned to.
const MACHINE_CODE_COLUMN: usize = 40;

/// Sink for emitted instructions.
pub trait Logger {
    fn flags(&self) -> FormatFlags;

    /// Called once per successfully encoded instruction.
    fn log_instruction(&mut self, text: &str, machine_code: &[u8]) -> io::Result<()>;
}

/// Writes one line per instruction to any [`Write`] sink.
pub struct FileLogger<W> {
    out: W,
    flags: FormatFlags,
}

impl<W: Write> FileLogger<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            flags: FormatFlags::empty(),
        }
    }

    pub fn add_flags(&mut self, flags: FormatFlags) {
        self.flags |= flags;
    }

    pub fn clear_flags(&mut self, flags: FormatFlags) {
        self.flags &= !flags;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Logger for FileLogger<W> {
    fn flags(&self) -> FormatFlags {
        self.flags
    }

    fn log_instruction(&mut self, text: &str, machine_code: &[u8]) -> io::Result<()> {
        let line = format_line(text, machine_code, self.flags);
        writeln!(self.out, "{line}")
    }
}

fn format_line(text: &str, machine_code: &[u8], flags: FormatFlags) -> String {
    if !flags.contains(FormatFlags::MACHINE_CODE) {
        return text.to_string();
    }

    let mut line = format!("{text:<width$}; ", width = MACHINE_CODE_COLUMN);
    for byte in machine_code {
        let _ = write!(line, "{byte:02X}");
    }
    line
}

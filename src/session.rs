use std::io::Write;

use opcode_emit::x86::Assembler;
use opcode_emit::{Arch, CodeHolder, ErrorHandler, FileLogger, FormatFlags};
use opcode_gen::generate_opcodes;

use crate::{DumpConfig, SharedOutput};

/// Bytes produced by one emission session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBuffer {
    pub arch: Arch,
    pub bytes: Vec<u8>,
}

/// Runs one emission session for `config` and returns its (possibly partial) code.
///
/// The error handler is attached before anything is emitted. When `log_machine_code` is
/// set, every encoded instruction is also written to `out` along with its bytes. Faults
/// never stop generation; they only reach `handler`.
pub fn run_session<W: Write>(
    config: &DumpConfig,
    handler: &dyn ErrorHandler,
    log_machine_code: bool,
    out: &SharedOutput<W>,
) -> CodeBuffer {
    let mut logger = machine_code_logger(out, log_machine_code);

    let mut code = CodeHolder::new();
    code.set_error_handler(handler);
    if let Err(err) = code.init(config.arch) {
        code.report_error(&err);
    }
    if let Some(logger) = logger.as_mut() {
        code.set_logger(logger);
    }

    {
        let mut assembler = Assembler::new(&mut code);
        generate_opcodes(assembler.as_x86(), config.use_rex1, config.use_rex2);
    }

    tracing::debug!(
        arch = %config.arch,
        rex1 = config.use_rex1,
        rex2 = config.use_rex2,
        size = code.code_size(),
        "session finished"
    );

    CodeBuffer {
        arch: config.arch,
        bytes: code.into_buffer(),
    }
}

fn machine_code_logger<W: Write>(
    out: &SharedOutput<W>,
    enabled: bool,
) -> Option<FileLogger<SharedOutput<W>>> {
    enabled.then(|| {
        let mut logger = FileLogger::new(out.clone());
        logger.add_flags(FormatFlags::MACHINE_CODE);
        logger
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use opcode_emit::{ErrorCode, Logger};

    use super::*;
    use crate::DUMP_MATRIX;

    fn quiet() -> SharedOutput<Vec<u8>> {
        SharedOutput::new(Vec::new())
    }

    #[test]
    fn same_config_produces_identical_buffers() {
        let handler = |_: ErrorCode, _: &str, _: &CodeHolder<'_>| {};
        for config in DUMP_MATRIX {
            let a = run_session(&config, &handler, false, &quiet());
            let b = run_session(&config, &handler, true, &quiet());
            assert_eq!(a, b, "{config}");
            assert_eq!(a.arch, config.arch);
            assert_eq!(a.bytes.first(), Some(&0xc3));
        }
    }

    #[test]
    fn logging_writes_one_line_per_encoded_instruction() {
        let out = quiet();
        let handler = |_: ErrorCode, _: &str, _: &CodeHolder<'_>| {};
        run_session(&DUMP_MATRIX[1], &handler, true, &out);

        let text = String::from_utf8(out.get_ref().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), opcode_gen::opcode_count());
        assert!(lines[0].starts_with("ret"));
        assert!(lines[0].ends_with("; C3"));
    }

    #[test]
    fn logger_exists_only_when_enabled() {
        let out = quiet();
        assert!(machine_code_logger(&out, false).is_none());

        let logger = machine_code_logger(&out, true).expect("logger");
        assert!(logger.flags().contains(FormatFlags::MACHINE_CODE));
    }

    #[test]
    fn logging_disabled_writes_nothing() {
        let out = quiet();
        let handler = |_: ErrorCode, _: &str, _: &CodeHolder<'_>| {};
        run_session(&DUMP_MATRIX[1], &handler, false, &out);
        assert!(out.get_ref().is_empty());
    }

    #[test]
    fn uninitializable_arch_reports_and_yields_empty_buffer() {
        let faults = Cell::new(0usize);
        let first = Cell::new(None);
        let handler = |code: ErrorCode, _: &str, _: &CodeHolder<'_>| {
            if first.get().is_none() {
                first.set(Some(code));
            }
            faults.set(faults.get() + 1);
        };

        let config = DumpConfig::new(Arch::None, false, false);
        let buffer = run_session(&config, &handler, true, &quiet());

        assert!(buffer.bytes.is_empty());
        assert_eq!(first.get(), Some(ErrorCode::InvalidArch));
        // The init failure plus one report per requested instruction.
        assert_eq!(faults.get(), 1 + opcode_gen::opcode_count());
    }
}

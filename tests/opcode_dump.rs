use std::cell::Cell;
use std::rc::Rc;

use opcode_dump::{run_matrix, DumpConfig, DumpSummary, HarnessOptions, SharedOutput, DUMP_MATRIX};
use opcode_emit::Arch;
use opcode_jit::{ExecAllocator, JitError, JitFunction};

struct RecordedCall {
    calls: Rc<Cell<usize>>,
}

impl JitFunction for RecordedCall {
    unsafe fn call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

/// Stands in for the executable-memory runtime so host matching can be tested on any machine.
struct FakeRuntime {
    calls: Rc<Cell<usize>>,
    mapped: Vec<Vec<u8>>,
    fail: bool,
}

impl FakeRuntime {
    fn new() -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
            mapped: Vec::new(),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl ExecAllocator for FakeRuntime {
    type Code = RecordedCall;

    fn map_executable(&mut self, code: &[u8]) -> Result<RecordedCall, JitError> {
        if self.fail {
            return Err(JitError::Unsupported("mapping disabled"));
        }
        self.mapped.push(code.to_vec());
        Ok(RecordedCall {
            calls: Rc::clone(&self.calls),
        })
    }
}

fn run(
    configs: &[DumpConfig],
    host: Arch,
    runtime: &mut FakeRuntime,
) -> (DumpSummary, String) {
    let out = SharedOutput::new(Vec::new());
    let options = HarnessOptions {
        log_machine_code: true,
        host,
    };
    let summary = run_matrix(configs, &options, &out, runtime);
    let text = String::from_utf8(out.get_ref().clone()).expect("utf-8 output");
    (summary, text)
}

fn headers(text: &str) -> Vec<&str> {
    text.lines().filter(|l| l.starts_with("Opcodes [")).collect()
}

#[test]
fn headers_follow_matrix_order() {
    let mut rt = FakeRuntime::new();
    let (summary, text) = run(&DUMP_MATRIX, Arch::None, &mut rt);

    assert_eq!(
        headers(&text),
        vec![
            "Opcodes [ARCH=X86 REX1=false REX2=false]",
            "Opcodes [ARCH=X64 REX1=false REX2=false]",
            "Opcodes [ARCH=X64 REX1=false REX2=true]",
            "Opcodes [ARCH=X64 REX1=true REX2=false]",
            "Opcodes [ARCH=X64 REX1=true REX2=true]",
        ]
    );
    assert_eq!(
        summary,
        DumpSummary {
            configs: 5,
            errors: 0,
            executed: 0,
            exec_failures: 0,
        }
    );
    assert!(rt.mapped.is_empty());
}

#[test]
fn only_host_matching_entries_execute() {
    let mut rt = FakeRuntime::new();
    let (summary, _) = run(&DUMP_MATRIX, Arch::X64, &mut rt);
    assert_eq!(summary.executed, 4);
    assert_eq!(rt.calls.get(), 4);
    assert!(rt.mapped.iter().all(|code| code.first() == Some(&0xc3)));

    let mut rt = FakeRuntime::new();
    let (summary, _) = run(&DUMP_MATRIX, Arch::X86, &mut rt);
    assert_eq!(summary.executed, 1);
    assert_eq!(rt.calls.get(), 1);

    let mut rt = FakeRuntime::new();
    let (summary, _) = run(&DUMP_MATRIX, Arch::A64, &mut rt);
    assert_eq!(summary.executed, 0);
    assert_eq!(rt.calls.get(), 0);
}

#[test]
fn mapping_failures_do_not_stop_the_run() {
    let mut rt = FakeRuntime::failing();
    let (summary, text) = run(&DUMP_MATRIX, Arch::X64, &mut rt);

    assert_eq!(summary.configs, 5);
    assert_eq!(summary.exec_failures, 4);
    assert_eq!(summary.executed, 0);
    assert_eq!(headers(&text).len(), 5);
    assert_eq!(
        text.lines()
            .filter(|l| l.starts_with("JIT ERROR: "))
            .count(),
        4
    );
    // The last configuration was still dumped after the earlier failures.
    let last_header = text
        .rfind("Opcodes [ARCH=X64 REX1=true REX2=true]")
        .expect("last header");
    assert!(text[last_header..].lines().count() > 2);
}

#[test]
fn single_host_entry_end_to_end() {
    let config = DumpConfig::new(Arch::X64, false, false);
    let mut rt = FakeRuntime::new();
    let (summary, text) = run(&[config], Arch::X64, &mut rt);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Opcodes [ARCH=X64 REX1=false REX2=false]");
    assert!(lines[1].starts_with("ret"));
    assert!(lines[1].ends_with("; C3"));
    assert_eq!(lines.len(), 1 + opcode_gen::opcode_count());
    assert!(!text.contains("ERROR"));

    assert_eq!(rt.mapped.len(), 1);
    assert_eq!(rt.calls.get(), 1);
    assert_eq!(summary.executed, 1);
    assert_eq!(summary.errors, 0);
}

#[test]
fn encoding_faults_are_printed_and_counted() {
    // Extended registers do not exist in 32-bit mode.
    let config = DumpConfig::new(Arch::X86, true, true);
    let mut rt = FakeRuntime::new();
    let (summary, text) = run(&[config], Arch::X86, &mut rt);

    let error_lines: Vec<&str> = text.lines().filter(|l| l.starts_with("ERROR 0x")).collect();
    assert!(!error_lines.is_empty());
    assert_eq!(error_lines.len(), summary.errors);
    assert!(error_lines.iter().all(|l| l.contains(": cannot encode ")));

    // The partial buffer still starts with `ret` and is still executed.
    assert_eq!(summary.executed, 1);
    assert_eq!(rt.mapped[0].first(), Some(&0xc3));
}

#[test]
fn disabling_the_logger_leaves_only_headers() {
    let out = SharedOutput::new(Vec::new());
    let options = HarnessOptions {
        log_machine_code: false,
        host: Arch::None,
    };
    let mut rt = FakeRuntime::new();
    run_matrix(&DUMP_MATRIX, &options, &out, &mut rt);

    let text = String::from_utf8(out.get_ref().clone()).unwrap();
    assert_eq!(text.lines().count(), DUMP_MATRIX.len());
}

#[cfg(all(unix, target_arch = "x86_64"))]
#[test]
fn real_runtime_executes_host_entries() {
    let out = SharedOutput::new(Vec::new());
    let mut rt = opcode_jit::JitRuntime::new();
    let summary = run_matrix(&DUMP_MATRIX, &HarnessOptions::default(), &out, &mut rt);

    assert_eq!(summary.executed, 4);
    assert_eq!(summary.exec_failures, 0);
    assert_eq!(rt.mapped_count(), 4);
}

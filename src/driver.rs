use std::io::Write;

use opcode_emit::Arch;
use opcode_jit::ExecAllocator;

use crate::{run_session, DumpConfig, ErrorReporter, ExecutionGate, GateOutcome, SharedOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Dump every encoded instruction with its machine code.
    pub log_machine_code: bool,
    /// Architecture whose buffers are executed in-process.
    pub host: Arch,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            log_machine_code: cfg!(feature = "logging"),
            host: Arch::HOST,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub configs: usize,
    /// Emission faults reported across all configurations.
    pub errors: usize,
    pub executed: usize,
    pub exec_failures: usize,
}

/// Dumps every configuration in order, executing host-matching buffers.
///
/// Configurations are independent: each gets a fresh session, and neither encoding faults
/// nor mapping faults stop the run.
pub fn run_matrix<W, A>(
    configs: &[DumpConfig],
    options: &HarnessOptions,
    out: &SharedOutput<W>,
    runtime: &mut A,
) -> DumpSummary
where
    W: Write,
    A: ExecAllocator,
{
    let reporter = ErrorReporter::new(out.clone());
    let gate = ExecutionGate::new(options.host);
    let mut summary = DumpSummary::default();

    for config in configs {
        if let Err(err) = out.write_line(format_args!("{config}")) {
            tracing::warn!("failed to write header: {err}");
        }

        let buffer = run_session(config, &reporter, options.log_machine_code, out);
        match gate.run(buffer, runtime, out) {
            GateOutcome::Executed => summary.executed += 1,
            GateOutcome::MapFailed => summary.exec_failures += 1,
            GateOutcome::NotHost => {}
        }
        summary.configs += 1;
    }

    summary.errors = reporter.reported();
    summary
}

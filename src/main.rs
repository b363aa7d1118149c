use std::io::{self, Write};
use std::process::ExitCode;

use opcode_dump::{run_matrix, HarnessOptions, SharedOutput, DUMP_MATRIX};
use opcode_jit::JitRuntime;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut out = SharedOutput::new(io::stdout().lock());
    let mut runtime = JitRuntime::new();
    let options = HarnessOptions::default();

    let summary = run_matrix(&DUMP_MATRIX, &options, &out, &mut runtime);
    if let Err(err) = out.flush() {
        tracing::warn!("failed to flush stdout: {err}");
    }

    tracing::info!(
        configs = summary.configs,
        errors = summary.errors,
        executed = summary.executed,
        exec_failures = summary.exec_failures,
        host = %options.host,
        "opcode dump finished"
    );

    // Encoding and mapping faults are part of the dump, not failures.
    ExitCode::SUCCESS
}

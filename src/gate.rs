use std::io::Write;

use opcode_emit::Arch;
use opcode_jit::{ExecAllocator, JitFunction};

use crate::{CodeBuffer, SharedOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Buffer targets a different architecture; nothing was mapped or called.
    NotHost,
    /// Buffer was mapped and called once.
    Executed,
    /// Buffer targets the host but could not be mapped executable.
    MapFailed,
}

/// Runs host-matching code buffers in-process.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionGate {
    host: Arch,
}

impl ExecutionGate {
    pub fn new(host: Arch) -> Self {
        Self { host }
    }

    pub fn host(&self) -> Arch {
        self.host
    }

    pub fn host_matches(&self, arch: Arch) -> bool {
        arch != Arch::None && arch == self.host
    }

    /// Maps and calls `buffer` once if it targets the host; otherwise does nothing.
    ///
    /// Partial buffers (left behind by reported encoding faults) are still executed: the
    /// leading `ret` is emitted before anything that can fault.
    pub fn run<A, W>(
        &self,
        buffer: CodeBuffer,
        runtime: &mut A,
        out: &SharedOutput<W>,
    ) -> GateOutcome
    where
        A: ExecAllocator,
        W: Write,
    {
        if !self.host_matches(buffer.arch) {
            return GateOutcome::NotHost;
        }

        let func = match runtime.map_executable(&buffer.bytes) {
            Ok(func) => func,
            Err(err) => {
                tracing::warn!(arch = %buffer.arch, "failed to map generated code: {err}");
                if let Err(io_err) = out.write_line(format_args!("JIT ERROR: {err}")) {
                    tracing::warn!("failed to write mapping error: {io_err}");
                }
                return GateOutcome::MapFailed;
            }
        };

        tracing::debug!(
            arch = %buffer.arch,
            host = %self.host(),
            len = buffer.bytes.len(),
            "calling generated code"
        );
        // SAFETY: generated opcode sequences start with `ret`, so the call returns at once.
        unsafe { func.call() };
        GateOutcome::Executed
    }
}

//! Opcode dump harness.
//!
//! Drives the x86 assembler through a fixed matrix of target configurations. Every
//! configuration is printed as a machine-code dump for offline disassembly; configurations
//! that match the host architecture are also mapped executable and called once.
//!
//! Encoding faults and mapping faults are diagnostic output, never process failures.

mod driver;
mod gate;
mod matrix;
mod output;
mod reporter;
mod session;

pub use driver::{run_matrix, DumpSummary, HarnessOptions};
pub use gate::{ExecutionGate, GateOutcome};
pub use matrix::{DumpConfig, DUMP_MATRIX};
pub use output::SharedOutput;
pub use reporter::ErrorReporter;
pub use session::{run_session, CodeBuffer};

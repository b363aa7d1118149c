use core::fmt;

use opcode_emit::Arch;

/// One row of the dump matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    pub arch: Arch,
    /// Move the first operand group to extended registers (REX.R).
    pub use_rex1: bool,
    /// Move the second operand group and memory base/index to extended registers (REX.B/X).
    pub use_rex2: bool,
}

impl DumpConfig {
    pub const fn new(arch: Arch, use_rex1: bool, use_rex2: bool) -> Self {
        Self {
            arch,
            use_rex1,
            use_rex2,
        }
    }
}

/// Header line printed before each configuration's dump.
impl fmt::Display for DumpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Opcodes [ARCH={} REX1={} REX2={}]",
            self.arch.name(),
            self.use_rex1,
            self.use_rex2
        )
    }
}

/// Grouped by architecture, then by flag progression.
pub const DUMP_MATRIX: [DumpConfig; 5] = [
    DumpConfig::new(Arch::X86, false, false),
    DumpConfig::new(Arch::X64, false, false),
    DumpConfig::new(Arch::X64, false, true),
    DumpConfig::new(Arch::X64, true, false),
    DumpConfig::new(Arch::X64, true, true),
];

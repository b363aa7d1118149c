use core::fmt;

/// Target architecture of a code holder.
///
/// The numeric ids are stable and match the order below; `None` is the
/// "not initialised" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Arch {
    None = 0,
    X86 = 1,
    X64 = 2,
    A32 = 3,
    A64 = 4,
}

impl Arch {
    pub const ALL: [Arch; 5] = [Arch::None, Arch::X86, Arch::X64, Arch::A32, Arch::A64];

    /// Architecture of the machine this binary was compiled for.
    pub const HOST: Arch = if cfg!(target_arch = "x86_64") {
        Arch::X64
    } else if cfg!(target_arch = "x86") {
        Arch::X86
    } else if cfg!(target_arch = "aarch64") {
        Arch::A64
    } else if cfg!(target_arch = "arm") {
        Arch::A32
    } else {
        Arch::None
    };

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Arch::None),
            1 => Some(Arch::X86),
            2 => Some(Arch::X64),
            3 => Some(Arch::A32),
            4 => Some(Arch::A64),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Arch::None => "None",
            Arch::X86 => "X86",
            Arch::X64 => "X64",
            Arch::A32 => "A32",
            Arch::A64 => "A64",
        }
    }

    /// Operand/address width used by the x86 encoder, `None` outside the x86 family.
    pub fn bitness(self) -> Option<u32> {
        match self {
            Arch::X86 => Some(32),
            Arch::X64 => Some(64),
            _ => None,
        }
    }

    pub fn is_x86_family(self) -> bool {
        self.bitness().is_some()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display label for a raw architecture id. Unknown ids map to `"<unknown>"`.
pub fn arch_id_to_str(id: u32) -> &'static str {
    Arch::from_id(id).map_or("<unknown>", Arch::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for arch in Arch::ALL {
            assert_eq!(Arch::from_id(arch.id()), Some(arch));
        }
        assert_eq!(Arch::from_id(5), None);
    }

    #[test]
    fn labels_are_fixed() {
        assert_eq!(arch_id_to_str(0), "None");
        assert_eq!(arch_id_to_str(1), "X86");
        assert_eq!(arch_id_to_str(2), "X64");
        assert_eq!(arch_id_to_str(3), "A32");
        assert_eq!(arch_id_to_str(4), "A64");
        assert_eq!(arch_id_to_str(0xffff_ffff), "<unknown>");
        assert_eq!(Arch::X64.to_string(), "X64");
    }

    #[test]
    fn only_x86_family_has_bitness() {
        assert_eq!(Arch::X86.bitness(), Some(32));
        assert_eq!(Arch::X64.bitness(), Some(64));
        assert!(!Arch::None.is_x86_family());
        assert!(!Arch::A32.is_x86_family());
        assert!(!Arch::A64.is_x86_family());
    }

    #[test]
    fn host_matches_target_arch() {
        if cfg!(target_arch = "x86_64") {
            assert_eq!(Arch::HOST, Arch::X64);
        } else if cfg!(target_arch = "aarch64") {
            assert_eq!(Arch::HOST, Arch::A64);
        }
    }
}

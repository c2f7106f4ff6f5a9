use crate::identity::{ElfIdentity, WordWidth};
use std::fmt;

// e_machine values, from the gABI and the processor supplements.
pub const EM_SPARC: u16 = 2;
pub const EM_386: u16 = 3;
pub const EM_68K: u16 = 4;
pub const EM_MIPS: u16 = 8;
pub const EM_MIPS_RS3_LE: u16 = 10;
pub const EM_PARISC: u16 = 15;
pub const EM_SPARC32PLUS: u16 = 18;
pub const EM_PPC: u16 = 20;
pub const EM_PPC64: u16 = 21;
pub const EM_S390: u16 = 22;
pub const EM_ARM: u16 = 40;
pub const EM_FAKE_ALPHA: u16 = 41;
pub const EM_SH: u16 = 42;
pub const EM_SPARCV9: u16 = 43;
pub const EM_IA_64: u16 = 50;
pub const EM_X86_64: u16 = 62;
pub const EM_AARCH64: u16 = 183;
pub const EM_ALPHA: u16 = 0x9026;

/// MIPS `e_flags` bit marking an n32 object.
pub const EF_MIPS_ABI2: u32 = 0x20;
/// ARM `e_flags` mask holding the EABI version. Zero means the legacy
/// OABI.
pub const EF_ARM_EABIMASK: u32 = 0xff00_0000;

/// Canonical multilib ABI identifier.
///
/// `Unknown` covers every machine code outside the table; it is a
/// reportable outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultilibAbi {
    Alpha64,
    ArmEabi,
    ArmOabi,
    Arm64,
    M68k32,
    MipsO32,
    MipsN32,
    MipsN64,
    Ia64,
    Hppa32,
    Ppc32,
    Ppc64,
    S390_32,
    S390_64,
    Sh32,
    Sparc32,
    Sparc64,
    X86_32,
    X86X32,
    X86_64,
    Unknown,
}

impl MultilibAbi {
    pub fn as_str(self) -> &'static str {
        match self {
            MultilibAbi::Alpha64 => "alpha_64",
            MultilibAbi::ArmEabi => "arm_eabi",
            MultilibAbi::ArmOabi => "arm_oabi",
            MultilibAbi::Arm64 => "arm_64",
            MultilibAbi::M68k32 => "m68k_32",
            MultilibAbi::MipsO32 => "mips_o32",
            MultilibAbi::MipsN32 => "mips_n32",
            MultilibAbi::MipsN64 => "mips_n64",
            MultilibAbi::Ia64 => "ia_64",
            MultilibAbi::Hppa32 => "hppa_32",
            MultilibAbi::Ppc32 => "ppc_32",
            MultilibAbi::Ppc64 => "ppc_64",
            MultilibAbi::S390_32 => "s390_32",
            MultilibAbi::S390_64 => "s390_64",
            MultilibAbi::Sh32 => "sh_32",
            MultilibAbi::Sparc32 => "sparc_32",
            MultilibAbi::Sparc64 => "sparc_64",
            MultilibAbi::X86_32 => "x86_32",
            MultilibAbi::X86X32 => "x86_x32",
            MultilibAbi::X86_64 => "x86_64",
            MultilibAbi::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MultilibAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Maps an extracted identity to its multilib ABI identifier.
///
/// Total over all inputs. The machine code picks the family; only
/// families with more than one ABI consult the word width or flags.
pub fn multilib_abi(ident: &ElfIdentity) -> MultilibAbi {
    use MultilibAbi::*;

    match ident.machine {
        EM_ALPHA | EM_FAKE_ALPHA => Alpha64,
        EM_ARM => {
            if ident.flags & EF_ARM_EABIMASK != 0 {
                ArmEabi
            } else {
                ArmOabi
            }
        }
        EM_AARCH64 => Arm64,
        EM_68K => M68k32,
        EM_MIPS | EM_MIPS_RS3_LE => match ident.word_width {
            WordWidth::W64 => MipsN64,
            WordWidth::W32 if ident.flags & EF_MIPS_ABI2 != 0 => MipsN32,
            WordWidth::W32 => MipsO32,
        },
        EM_IA_64 => Ia64,
        EM_PARISC => Hppa32,
        EM_PPC => Ppc32,
        EM_PPC64 => Ppc64,
        EM_S390 => match ident.word_width {
            WordWidth::W64 => S390_64,
            WordWidth::W32 => S390_32,
        },
        EM_SH => Sh32,
        EM_SPARC | EM_SPARC32PLUS => Sparc32,
        EM_SPARCV9 => Sparc64,
        EM_386 => X86_32,
        EM_X86_64 => match ident.word_width {
            WordWidth::W64 => X86_64,
            // 64-bit instruction set under a 32-bit object: the ILP32
            // x32 ABI.
            WordWidth::W32 => X86X32,
        },
        _ => Unknown,
    }
}

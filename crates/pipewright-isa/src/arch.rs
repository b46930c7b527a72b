//! Instruction dialects and the architecture registry.
//!
//! A dialect is the full, ordered set of variant definitions of one
//! architecture family together with its register name space. The order of
//! definitions is the order in which the parser tries them.

use std::fmt;

use crate::datatype::DataTypeKind;
use crate::error::{IsaError, Result};
use crate::instruction::{InstrDef, MemoryAccess, Opcode};
use crate::register::{RegisterClass, RegisterFile, AARCH64_REGISTERS, ARMV81M_REGISTERS};

const R: RegisterClass = RegisterClass::Gpr;
const V: RegisterClass = RegisterClass::Vector;
const VS: RegisterClass = RegisterClass::VectorStack;
const RS: RegisterClass = RegisterClass::GprStack;

/// An instruction dialect.
#[derive(Debug)]
pub struct Arch {
    /// Registry name, e.g. `Arm_v81M`.
    pub name: &'static str,
    /// One-line summary of the dialect.
    pub description: &'static str,
    defs: &'static [InstrDef],
    registers: &'static RegisterFile,
}

impl Arch {
    /// A dialect over `defs`, whose operands are named from `registers`.
    pub const fn new(
        name: &'static str,
        description: &'static str,
        defs: &'static [InstrDef],
        registers: &'static RegisterFile,
    ) -> Self {
        Self {
            name,
            description,
            defs,
            registers,
        }
    }

    /// All variant definitions in trial order.
    pub fn defs(&self) -> &'static [InstrDef] {
        self.defs
    }

    /// Definition of `opcode` in this dialect.
    pub fn def(&self, opcode: Opcode) -> Option<&'static InstrDef> {
        self.defs.iter().find(|d| d.opcode == opcode)
    }

    /// Register names of this dialect, by class.
    pub fn registers(&self) -> &'static RegisterFile {
        self.registers
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.description)
    }
}

const fn reg(
    name: &'static str,
    opcode: Opcode,
    mnemonic: &'static str,
    datatype: Option<DataTypeKind>,
    outputs: &'static [RegisterClass],
    in_outs: &'static [RegisterClass],
    inputs: &'static [RegisterClass],
) -> InstrDef {
    InstrDef {
        name,
        opcode,
        mnemonic,
        datatype,
        outputs,
        in_outs,
        inputs,
        memory: None,
    }
}

const fn mem(
    name: &'static str,
    opcode: Opcode,
    mnemonic: &'static str,
    datatype: Option<DataTypeKind>,
    access: MemoryAccess,
    outputs: &'static [RegisterClass],
    inputs: &'static [RegisterClass],
) -> InstrDef {
    InstrDef {
        name,
        opcode,
        mnemonic,
        datatype,
        outputs,
        in_outs: &[],
        inputs,
        memory: Some(access),
    }
}

static ARMV81M_DEFS: [InstrDef; 14] = [
    reg("vmul", Opcode::Vmul, "vmul", Some(DataTypeKind::Any), &[V], &[], &[V, V]),
    reg(
        "vmul_scalar",
        Opcode::VmulScalar,
        "vmul",
        Some(DataTypeKind::Integer),
        &[V],
        &[],
        &[V, R],
    ),
    reg("vmla", Opcode::Vmla, "vmla", Some(DataTypeKind::Integer), &[], &[V], &[V, R]),
    reg(
        "vqdmulh",
        Opcode::Vqdmulh,
        "vqdmulh",
        Some(DataTypeKind::Signed),
        &[V],
        &[],
        &[V, V],
    ),
    reg("vadd", Opcode::Vadd, "vadd", Some(DataTypeKind::Any), &[V], &[], &[V, V]),
    reg("vsub", Opcode::Vsub, "vsub", Some(DataTypeKind::Any), &[V], &[], &[V, V]),
    reg("add", Opcode::Add, "add", None, &[R], &[], &[R, R]),
    mem(
        "vldrw",
        Opcode::Vldrw,
        "vldrw",
        Some(DataTypeKind::Word),
        MemoryAccess::Load,
        &[V],
        &[R],
    ),
    mem(
        "vstrw",
        Opcode::Vstrw,
        "vstrw",
        Some(DataTypeKind::Word),
        MemoryAccess::Store,
        &[],
        &[V, R],
    ),
    reg("qsave", Opcode::Qsave, "qsave", None, &[VS], &[], &[V]),
    reg("qrestore", Opcode::Qrestore, "qrestore", None, &[V], &[], &[VS]),
    reg("rsave", Opcode::Rsave, "rsave", None, &[RS], &[], &[R]),
    reg("rrestore", Opcode::Rrestore, "rrestore", None, &[R], &[], &[RS]),
    reg("nop", Opcode::Nop, "nop", None, &[], &[], &[]),
];

static AARCH64_DEFS: [InstrDef; 17] = [
    reg("mul_v", Opcode::MulV, "mul", None, &[V], &[], &[V, V]),
    reg("mul_x", Opcode::MulX, "mul", None, &[R], &[], &[R, R]),
    reg("mla", Opcode::Mla, "mla", None, &[], &[V], &[V, V]),
    reg("add_v", Opcode::AddV, "add", None, &[V], &[], &[V, V]),
    reg("add_x", Opcode::AddX, "add", None, &[R], &[], &[R, R]),
    reg("sub_v", Opcode::SubV, "sub", None, &[V], &[], &[V, V]),
    reg("fmul", Opcode::Fmul, "fmul", Some(DataTypeKind::Float), &[V], &[], &[V, V]),
    mem("ldr", Opcode::Ldr, "ldr", None, MemoryAccess::Load, &[V], &[R]),
    mem("ldr_x", Opcode::LdrX, "ldr", None, MemoryAccess::Load, &[R], &[R]),
    mem("str", Opcode::Str, "str", None, MemoryAccess::Store, &[], &[V, R]),
    mem("str_x", Opcode::StrX, "str", None, MemoryAccess::Store, &[], &[R, R]),
    mem("stp", Opcode::Stp, "stp", None, MemoryAccess::Store, &[], &[V, V, R]),
    reg("vsave", Opcode::Vsave, "vsave", None, &[VS], &[], &[V]),
    reg("vrestore", Opcode::Vrestore, "vrestore", None, &[V], &[], &[VS]),
    reg("xsave", Opcode::Xsave, "xsave", None, &[RS], &[], &[R]),
    reg("xrestore", Opcode::Xrestore, "xrestore", None, &[R], &[], &[RS]),
    reg("nop", Opcode::Nop, "nop", None, &[], &[], &[]),
];

/// Armv8.1-M with the M-Profile Vector Extension.
pub static ARM_V81M: Arch = Arch::new(
    "Arm_v81M",
    "Armv8.1-M with Helium (MVE)",
    &ARMV81M_DEFS,
    &ARMV81M_REGISTERS,
);

/// AArch64 with Advanced SIMD.
pub static ARM_AARCH64: Arch = Arch::new(
    "Arm_AArch64",
    "Armv8-A AArch64 with Neon",
    &AARCH64_DEFS,
    &AARCH64_REGISTERS,
);

static ARCHS: [&Arch; 2] = [&ARM_V81M, &ARM_AARCH64];

/// Names of all registered architectures.
pub fn list_archs() -> Vec<&'static str> {
    ARCHS.iter().map(|a| a.name).collect()
}

/// Look up an architecture by exact name.
pub fn get_arch(name: &str) -> Result<&'static Arch> {
    ARCHS
        .iter()
        .copied()
        .find(|a| a.name == name)
        .ok_or_else(|| IsaError::UnknownArch {
            name: name.to_string(),
            valid: list_archs().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn lookup_known_arch() {
        let arch = get_arch("Arm_v81M").unwrap();
        assert_eq!(arch.name, "Arm_v81M");
        assert!(arch.def(Opcode::Vmla).is_some());
        assert!(arch.def(Opcode::Mla).is_none());
        assert_eq!(arch.to_string(), "Arm_v81M (Armv8.1-M with Helium (MVE))");
    }

    #[test]
    fn unknown_arch_lists_valid_names() {
        let err = get_arch("Arm_v7M").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Arm_v7M"));
        assert!(msg.contains("Arm_v81M"));
        assert!(msg.contains("Arm_AArch64"));
    }

    #[test]
    fn variant_names_unique_per_dialect() {
        for arch in ARCHS {
            let names: HashSet<_> = arch.defs().iter().map(|d| d.name).collect();
            assert_eq!(names.len(), arch.defs().len(), "{}", arch.name);
            let opcodes: HashSet<_> = arch.defs().iter().map(|d| d.opcode).collect();
            assert_eq!(opcodes.len(), arch.defs().len(), "{}", arch.name);
        }
    }

    #[test]
    fn memory_variants_end_with_gpr_base() {
        for arch in ARCHS {
            for def in arch.defs().iter().filter(|d| d.memory.is_some()) {
                assert_eq!(def.inputs.last(), Some(&RegisterClass::Gpr), "{}", def.name);
                assert!(def.in_outs.is_empty());
            }
        }
    }

    #[test]
    fn list_is_stable() {
        assert_eq!(list_archs(), vec!["Arm_v81M", "Arm_AArch64"]);
    }
}

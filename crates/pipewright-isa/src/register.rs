//! Register classes and per-dialect register name spaces.

use std::fmt;

/// Category of an operand slot.
///
/// Every slot of an instruction definition carries exactly one class. The class
/// is fixed by the definition and never derived from a register name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    /// General-purpose (scalar) register.
    Gpr,
    /// Vector register.
    Vector,
    /// Stack slot holding a spilled vector register.
    VectorStack,
    /// Stack slot holding a spilled general-purpose register.
    GprStack,
}

impl RegisterClass {
    /// All register classes, in declaration order.
    pub const ALL: [RegisterClass; 4] = [
        RegisterClass::Gpr,
        RegisterClass::Vector,
        RegisterClass::VectorStack,
        RegisterClass::GprStack,
    ];

    /// Whether the class names a stack slot rather than an architectural register.
    pub fn is_spill_slot(self) -> bool {
        matches!(self, RegisterClass::VectorStack | RegisterClass::GprStack)
    }
}

impl fmt::Display for RegisterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterClass::Gpr => write!(f, "gpr"),
            RegisterClass::Vector => write!(f, "vector"),
            RegisterClass::VectorStack => write!(f, "vector-stack"),
            RegisterClass::GprStack => write!(f, "gpr-stack"),
        }
    }
}

/// Canonical register names of one dialect, grouped by class.
#[derive(Debug)]
pub struct RegisterFile {
    /// General-purpose registers, e.g. `r0` or `x0`.
    pub gpr: &'static [&'static str],
    /// Vector registers, e.g. `q0` or `v0`.
    pub vector: &'static [&'static str],
    /// Spill slots for vector registers.
    pub vector_stack: &'static [&'static str],
    /// Spill slots for general-purpose registers.
    pub gpr_stack: &'static [&'static str],
}

impl RegisterFile {
    /// Canonical names of a class.
    pub fn names(&self, class: RegisterClass) -> &'static [&'static str] {
        match class {
            RegisterClass::Gpr => self.gpr,
            RegisterClass::Vector => self.vector,
            RegisterClass::VectorStack => self.vector_stack,
            RegisterClass::GprStack => self.gpr_stack,
        }
    }

    /// Whether `name` is a canonical name of `class`.
    pub fn contains(&self, class: RegisterClass, name: &str) -> bool {
        self.names(class).contains(&name)
    }

    /// The class a name belongs to, if any.
    pub fn class_of(&self, name: &str) -> Option<RegisterClass> {
        RegisterClass::ALL
            .into_iter()
            .find(|&class| self.contains(class, name))
    }
}

pub(crate) const ARMV81M_REGISTERS: RegisterFile = RegisterFile {
    gpr: &[
        "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13",
        "r14",
    ],
    vector: &["q0", "q1", "q2", "q3", "q4", "q5", "q6", "q7"],
    vector_stack: &[
        "QSTACK0", "QSTACK1", "QSTACK2", "QSTACK3", "QSTACK4", "QSTACK5", "QSTACK6", "QSTACK7",
    ],
    gpr_stack: &[
        "RSTACK0", "RSTACK1", "RSTACK2", "RSTACK3", "RSTACK4", "RSTACK5", "RSTACK6", "RSTACK7",
    ],
};

pub(crate) const AARCH64_REGISTERS: RegisterFile = RegisterFile {
    gpr: &[
        "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13",
        "x14", "x15", "x16", "x17", "x18", "x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26",
        "x27", "x28", "x29", "x30",
    ],
    vector: &[
        "v0", "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9", "v10", "v11", "v12", "v13",
        "v14", "v15", "v16", "v17", "v18", "v19", "v20", "v21", "v22", "v23", "v24", "v25", "v26",
        "v27", "v28", "v29", "v30", "v31",
    ],
    vector_stack: &[
        "VSTACK0", "VSTACK1", "VSTACK2", "VSTACK3", "VSTACK4", "VSTACK5", "VSTACK6", "VSTACK7",
        "VSTACK8", "VSTACK9", "VSTACK10", "VSTACK11", "VSTACK12", "VSTACK13", "VSTACK14",
        "VSTACK15",
    ],
    gpr_stack: &[
        "XSTACK0", "XSTACK1", "XSTACK2", "XSTACK3", "XSTACK4", "XSTACK5", "XSTACK6", "XSTACK7",
        "XSTACK8", "XSTACK9", "XSTACK10", "XSTACK11", "XSTACK12", "XSTACK13", "XSTACK14",
        "XSTACK15",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aarch64_register_counts() {
        assert_eq!(AARCH64_REGISTERS.gpr.len(), 31);
        assert_eq!(AARCH64_REGISTERS.vector.len(), 32);
        assert_eq!(AARCH64_REGISTERS.names(RegisterClass::GprStack).len(), 16);
    }

    #[test]
    fn class_lookup() {
        assert_eq!(ARMV81M_REGISTERS.class_of("q7"), Some(RegisterClass::Vector));
        assert_eq!(ARMV81M_REGISTERS.class_of("r14"), Some(RegisterClass::Gpr));
        assert_eq!(
            ARMV81M_REGISTERS.class_of("QSTACK3"),
            Some(RegisterClass::VectorStack)
        );
        assert_eq!(ARMV81M_REGISTERS.class_of("q8"), None);
        assert_eq!(AARCH64_REGISTERS.class_of("r0"), None);
    }

    #[test]
    fn name_spaces_are_disjoint() {
        for file in [&ARMV81M_REGISTERS, &AARCH64_REGISTERS] {
            for class in RegisterClass::ALL {
                for name in file.names(class) {
                    assert_eq!(file.class_of(name), Some(class), "{name}");
                }
            }
        }
    }

    #[test]
    fn spill_slots() {
        assert!(RegisterClass::VectorStack.is_spill_slot());
        assert!(!RegisterClass::Vector.is_spill_slot());
    }
}

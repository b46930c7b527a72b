//! Instruction definitions and parsed instruction instances.
//!
//! An [`InstrDef`] is the static signature of one instruction variant: its
//! mnemonic template and the register class of every operand slot. An
//! [`Instruction`] is one parsed occurrence of a variant with concrete operand
//! names. Definitions live in `static` dialect tables (see [`crate::arch`]);
//! instances are built by the parser and are read-only afterwards.

use std::fmt;

use crate::datatype::{is_float_suffix, DataTypeKind};
use crate::error::{IsaError, Result};
use crate::register::{RegisterClass, RegisterFile};

/// Closed set of instruction variants across all dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Arm_v81M (Helium)
    Vmul,
    VmulScalar,
    Vmla,
    Vqdmulh,
    Vadd,
    Vsub,
    Add,
    Vldrw,
    Vstrw,
    Qsave,
    Qrestore,
    Rsave,
    Rrestore,

    // Arm_AArch64
    MulV,
    MulX,
    Mla,
    AddV,
    AddX,
    SubV,
    Fmul,
    Ldr,
    LdrX,
    Str,
    StrX,
    Stp,
    Vsave,
    Vrestore,
    Xsave,
    Xrestore,

    Nop,
}

/// Direction of a memory access through a bracketed address operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryAccess {
    /// The first operand is filled from memory.
    Load,
    /// The leading register operands are written to memory.
    Store,
}

/// Static definition of one instruction variant.
///
/// Operand tokens in source order are the outputs, then the in-outs, then the
/// inputs. For memory variants the base address register is the last input and
/// is written inside brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrDef {
    /// Unique variant name within its dialect, used in diagnostics.
    pub name: &'static str,
    /// Operation tag shared with cost-table keys.
    pub opcode: Opcode,
    /// Base mnemonic without datatype suffix.
    pub mnemonic: &'static str,
    /// Suffix placeholder, if the mnemonic carries one.
    pub datatype: Option<DataTypeKind>,
    /// Classes of the write-only slots.
    pub outputs: &'static [RegisterClass],
    /// Classes of the slots both read and written.
    pub in_outs: &'static [RegisterClass],
    /// Classes of the read-only slots, base register last for memory variants.
    pub inputs: &'static [RegisterClass],
    /// Set for variants with a bracketed address operand.
    pub memory: Option<MemoryAccess>,
}

impl InstrDef {
    /// Total number of operand slots.
    pub fn operand_count(&self) -> usize {
        self.outputs.len() + self.in_outs.len() + self.inputs.len()
    }

    /// Classes of all slots in source order.
    pub fn slot_classes(&self) -> impl Iterator<Item = RegisterClass> + '_ {
        self.outputs
            .iter()
            .chain(self.in_outs)
            .chain(self.inputs)
            .copied()
    }

    /// Number of registers this variant writes (outputs and in-outs).
    pub fn written_count(&self) -> usize {
        self.outputs.len() + self.in_outs.len()
    }

    /// Mnemonic template, e.g. `vmul.<dt>`.
    pub fn template(&self) -> String {
        match self.datatype {
            Some(kind) => format!("{}.{kind}", self.mnemonic),
            None => self.mnemonic.to_string(),
        }
    }
}

/// Addressing-mode fields of a load or store.
///
/// Write-back and post-increment are recorded so the instruction can be
/// re-emitted, but the resulting update of the base register is not reported
/// as a written operand: loads and stores sharing a base stay freely reorderable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Base register inside the brackets.
    pub base: String,
    /// Offset inside the brackets, without the `#`.
    pub pre_index: Option<String>,
    /// Offset after the brackets, without the `#`.
    pub post_index: Option<String>,
    /// Trailing `!` on a pre-indexed address.
    pub writeback: bool,
}

impl Address {
    /// Amount the base register advances by, if it is updated at all.
    pub fn increment(&self) -> Option<&str> {
        if self.writeback {
            self.pre_index.as_deref()
        } else {
            self.post_index.as_deref()
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.base)?;
        if let Some(ref pre) = self.pre_index {
            write!(f, ", #{pre}")?;
        }
        write!(f, "]")?;
        if self.writeback {
            write!(f, "!")?;
        }
        if let Some(ref post) = self.post_index {
            write!(f, ", #{post}")?;
        }
        Ok(())
    }
}

/// One parsed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    def: &'static InstrDef,
    outputs: Vec<String>,
    in_outs: Vec<String>,
    inputs: Vec<String>,
    datatype: Option<String>,
    address: Option<Address>,
}

impl Instruction {
    /// Build an instance from operand names in source order.
    ///
    /// The operand count must equal the definition's slot count. For memory
    /// variants the last operand must be the address base.
    pub fn from_operands(
        def: &'static InstrDef,
        operands: Vec<String>,
        datatype: Option<String>,
        address: Option<Address>,
    ) -> Result<Self> {
        if operands.len() != def.operand_count() {
            return Err(IsaError::OperandCount {
                variant: def.name,
                expected: def.operand_count(),
                found: operands.len(),
            });
        }
        let mut operands = operands.into_iter();
        let outputs: Vec<String> = operands.by_ref().take(def.outputs.len()).collect();
        let in_outs: Vec<String> = operands.by_ref().take(def.in_outs.len()).collect();
        let inputs: Vec<String> = operands.collect();
        Ok(Self {
            def,
            outputs,
            in_outs,
            inputs,
            datatype,
            address,
        })
    }

    /// Variant this instance was parsed as.
    pub fn def(&self) -> &'static InstrDef {
        self.def
    }

    pub fn opcode(&self) -> Opcode {
        self.def.opcode
    }

    /// Base mnemonic, without the datatype suffix.
    pub fn mnemonic(&self) -> &'static str {
        self.def.mnemonic
    }

    /// Register names written only.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Register names read and written.
    pub fn in_outs(&self) -> &[String] {
        &self.in_outs
    }

    /// Register names read only, including the address base.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Concrete datatype suffix, e.g. `s32`.
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    /// Addressing mode of a load or store.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Register written at `index`, counting outputs first and then in-outs.
    pub fn written(&self, index: usize) -> Option<&str> {
        self.outputs
            .iter()
            .chain(&self.in_outs)
            .nth(index)
            .map(String::as_str)
    }

    /// Registers read by this instruction (in-outs, then inputs).
    pub fn reads(&self) -> impl Iterator<Item = &str> {
        self.in_outs.iter().chain(&self.inputs).map(String::as_str)
    }

    /// Whether every operand name belongs to its slot's declared class.
    pub fn fits_register_classes(&self, registers: &RegisterFile) -> bool {
        self.def
            .slot_classes()
            .zip(self.outputs.iter().chain(&self.in_outs).chain(&self.inputs))
            .all(|(class, name)| registers.contains(class, name))
    }

    pub fn is_vector_mul(&self) -> bool {
        matches!(
            self.opcode(),
            Opcode::Vmul
                | Opcode::VmulScalar
                | Opcode::Vmla
                | Opcode::Vqdmulh
                | Opcode::MulV
                | Opcode::Mla
                | Opcode::Fmul
        )
    }

    pub fn is_multiply_accumulate(&self) -> bool {
        matches!(self.opcode(), Opcode::Vmla | Opcode::Mla)
    }

    pub fn is_vector_add_sub(&self) -> bool {
        matches!(
            self.opcode(),
            Opcode::Vadd | Opcode::Vsub | Opcode::AddV | Opcode::SubV
        )
    }

    pub fn is_vector_load(&self) -> bool {
        matches!(self.opcode(), Opcode::Vldrw | Opcode::Ldr)
    }

    pub fn is_load(&self) -> bool {
        self.def.memory == Some(MemoryAccess::Load)
    }

    pub fn is_vector_store(&self) -> bool {
        matches!(self.opcode(), Opcode::Vstrw | Opcode::Str | Opcode::Stp)
    }

    pub fn is_store(&self) -> bool {
        self.def.memory == Some(MemoryAccess::Store)
    }

    pub fn is_stack_store(&self) -> bool {
        matches!(
            self.opcode(),
            Opcode::Qsave | Opcode::Rsave | Opcode::Vsave | Opcode::Xsave
        )
    }

    pub fn is_stack_load(&self) -> bool {
        matches!(
            self.opcode(),
            Opcode::Qrestore | Opcode::Rrestore | Opcode::Vrestore | Opcode::Xrestore
        )
    }

    pub fn is_stack_access(&self) -> bool {
        self.is_stack_load() || self.is_stack_store()
    }

    /// Floating-point lanes, either by variant or by datatype suffix.
    pub fn is_float(&self) -> bool {
        self.opcode() == Opcode::Fmul || self.datatype().is_some_and(is_float_suffix)
    }

    pub fn is_nop(&self) -> bool {
        self.opcode() == Opcode::Nop
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.def.mnemonic)?;
        if let Some(ref dt) = self.datatype {
            write!(f, ".{dt}")?;
        }
        let mut operands: Vec<&str> = self
            .outputs
            .iter()
            .chain(&self.in_outs)
            .chain(&self.inputs)
            .map(String::as_str)
            .collect();
        if self.address.is_some() {
            // base is printed inside the address
            operands.pop();
        }
        let mut sep = " ";
        for op in operands {
            write!(f, "{sep}{op}")?;
            sep = ", ";
        }
        if let Some(ref address) = self.address {
            write!(f, "{sep}{address}")?;
        }
        Ok(())
    }
}

//! Arm Neoverse N1: four-wide out-of-order core. Stores split into an address
//! micro-op on one of the load/store pipes and a data micro-op on the store
//! data pipe.

use pipewright_isa::{Arch, Instruction, Opcode, ARM_AARCH64};

use super::{feeds_accumulator, is_any_load, is_any_store};
use crate::error::Result;
use crate::latency::Latency;
use crate::model::{CostModel, CostTables};
use crate::resolver::Key;
use crate::units::{execution_units, ExecutionUnit, UnitRequirement};

execution_units! {
    pub enum Unit {
        B => "B",
        S0 => "S0",
        S1 => "S1",
        M => "M",
        L0 => "L0",
        L1 => "L1",
        D => "D",
        V0 => "V0",
        V1 => "V1",
    }
}

/// Cost model of the Neoverse N1.
#[derive(Debug, Clone)]
pub struct NeoverseN1 {
    tables: CostTables,
}

impl NeoverseN1 {
    /// Registry name.
    pub const NAME: &'static str = "Arm_Neoverse_N1";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        let store: &[&[Unit]] = &[&[Unit::L0, Unit::L1], &[Unit::D]];
        let units = units
            .rule(Key::pred(is_any_store), UnitRequirement::all(store))
            .rule(Key::pred(Instruction::is_vector_mul), UnitRequirement::any(&[Unit::V0]))
            .rule(
                Key::pred(Instruction::is_vector_add_sub),
                UnitRequirement::any(&[Unit::V0, Unit::V1]),
            )
            .rule(Opcode::MulX, UnitRequirement::any(&[Unit::M]))
            .rule(Key::pred(is_any_load), UnitRequirement::any(&[Unit::L0, Unit::L1]))
            .rule(Opcode::AddX, UnitRequirement::any(&[Unit::S0, Unit::S1, Unit::M]))
            .rule(Opcode::Nop, UnitRequirement::any(&[Unit::B, Unit::S0, Unit::S1]));

        let inverse_throughput = inverse_throughput
            .rule(Opcode::Stp, 2)
            .rule(
                Key::any([
                    Key::pred(Instruction::is_vector_mul),
                    Key::pred(Instruction::is_vector_add_sub),
                    Key::pred(is_any_load),
                    Key::pred(is_any_store),
                    Key::ops(&[Opcode::MulX, Opcode::AddX, Opcode::Nop]),
                ]),
                1,
            );

        let latency = latency
            .rule(Opcode::Ldr, 5)
            .rule(Key::any([Key::ops(&[Opcode::MulV, Opcode::Mla]), Key::pred(is_any_load)]), 4)
            .rule(Opcode::Fmul, 3)
            .rule(Key::ops(&[Opcode::AddV, Opcode::SubV, Opcode::MulX]), 2)
            .rule(Key::pred(is_any_store), 1)
            .rule(Key::ops(&[Opcode::AddX, Opcode::Nop]), 1);

        Self {
            tables: CostTables {
                units,
                inverse_throughput,
                latency,
            },
        }
    }
}

impl Default for NeoverseN1 {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for NeoverseN1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arch(&self) -> &'static Arch {
        &ARM_AARCH64
    }

    fn issue_rate(&self) -> u32 {
        4
    }

    fn unit_names(&self) -> &'static [&'static str] {
        Unit::NAMES
    }

    fn tables(&self) -> &CostTables {
        &self.tables
    }

    fn get_latency(
        &self,
        src: &Instruction,
        output_index: usize,
        dst: &Instruction,
    ) -> Result<Latency> {
        let base = self.base_latency(src)?;
        if src.opcode() == Opcode::Mla && feeds_accumulator(src, output_index, dst) {
            return Ok(Latency::Cycles(1));
        }
        Ok(Latency::Cycles(base))
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_as;
    use super::*;
    use crate::units::UnitSet;

    #[test]
    fn stores_need_address_and_data() {
        let model = NeoverseN1::new();
        for (line, op) in [
            ("str v0, [x1]", Opcode::Str),
            ("str x0, [x1]", Opcode::StrX),
            ("stp v0, v1, [x2]", Opcode::Stp),
            ("xsave XSTACK0, x3", Opcode::Xsave),
        ] {
            let inst = parse_as(&ARM_AARCH64, line, op);
            let units = model.get_units(&inst).unwrap();
            assert_eq!(
                units.sets(),
                &[UnitSet::of(&[Unit::L0, Unit::L1]), UnitSet::of(&[Unit::D])],
                "{line}"
            );
        }
    }

    #[test]
    fn loads_are_single_unit() {
        let model = NeoverseN1::new();
        let ldr = parse_as(&ARM_AARCH64, "ldr v0, [x1, #16]", Opcode::Ldr);
        assert!(!model.get_units(&ldr).unwrap().is_conjunction());
        assert_eq!(model.base_latency(&ldr).unwrap(), 5);
    }

    #[test]
    fn accumulate_chain() {
        let model = NeoverseN1::new();
        let a = parse_as(&ARM_AARCH64, "mla v0, v1, v2", Opcode::Mla);
        let b = parse_as(&ARM_AARCH64, "mla v0, v3, v4", Opcode::Mla);
        assert_eq!(model.get_latency(&a, 0, &b).unwrap(), Latency::Cycles(1));
        assert!(!model.has_min_max_objective());
    }
}

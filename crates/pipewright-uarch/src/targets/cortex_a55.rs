//! Arm Cortex-A55: dual-issue in-order core with two 64-bit vector pipes.

use log::debug;
use pipewright_isa::{Arch, Instruction, Opcode, ARM_AARCH64};

use super::{feeds_accumulator, is_any_load, is_any_store};
use crate::error::Result;
use crate::latency::Latency;
use crate::model::{CostModel, CostTables};
use crate::resolver::Key;
use crate::scheduler::Scheduler;
use crate::units::{execution_units, ExecutionUnit, UnitRequirement, UnitSet};

execution_units! {
    pub enum Unit {
        ScalarAlu0 => "SCALAR_ALU0",
        ScalarAlu1 => "SCALAR_ALU1",
        ScalarMac => "SCALAR_MAC",
        ScalarLoad => "SCALAR_LOAD",
        ScalarStore => "SCALAR_STORE",
        Vec0 => "VEC0",
        Vec1 => "VEC1",
    }
}

/// Cost model of the Cortex-A55.
#[derive(Debug, Clone)]
pub struct CortexA55 {
    tables: CostTables,
}

impl CortexA55 {
    /// Registry name.
    pub const NAME: &'static str = "Arm_Cortex_A55";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        // A Q-register pair store drains through both vector pipes.
        let pair_store: &[&[Unit]] = &[&[Unit::ScalarStore], &[Unit::Vec0, Unit::Vec1]];
        let units = units
            .rule(Opcode::Stp, UnitRequirement::all(pair_store))
            .rule(
                Key::any([
                    Key::pred(Instruction::is_vector_mul),
                    Key::pred(Instruction::is_vector_add_sub),
                ]),
                UnitRequirement::any(&[Unit::Vec0, Unit::Vec1]),
            )
            .rule(Opcode::MulX, UnitRequirement::any(&[Unit::ScalarMac]))
            .rule(Key::pred(is_any_load), UnitRequirement::any(&[Unit::ScalarLoad]))
            .rule(Key::pred(is_any_store), UnitRequirement::any(&[Unit::ScalarStore]))
            .rule(
                Key::ops(&[Opcode::AddX, Opcode::Nop]),
                UnitRequirement::any(&[Unit::ScalarAlu0, Unit::ScalarAlu1]),
            );

        let inverse_throughput = inverse_throughput
            .rule(Key::ops(&[Opcode::MulV, Opcode::Mla, Opcode::Stp]), 2)
            .rule(
                Key::any([
                    Opcode::Fmul.into(),
                    Key::pred(Instruction::is_vector_add_sub),
                    Key::pred(is_any_load),
                    Key::pred(is_any_store),
                    Key::ops(&[Opcode::MulX, Opcode::AddX, Opcode::Nop]),
                ]),
                1,
            );

        let latency = latency
            .rule(Key::ops(&[Opcode::MulV, Opcode::Mla, Opcode::Fmul]), 4)
            .rule(Key::pred(Instruction::is_vector_add_sub), 3)
            .rule(Key::pred(is_any_load), 3)
            .rule(Opcode::MulX, 3)
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

impl Default for CortexA55 {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for CortexA55 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arch(&self) -> &'static Arch {
        &ARM_AARCH64
    }

    fn issue_rate(&self) -> u32 {
        2
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
        let multiply = matches!(src.opcode(), Opcode::MulV | Opcode::Mla);
        if multiply && feeds_accumulator(src, output_index, dst) {
            return Ok(Latency::Cycles(1));
        }
        Ok(Latency::Cycles(base))
    }

    fn add_further_constraints(&self, scheduler: &mut dyn Scheduler) {
        // Floating-point multiplies issue on the first vector pipe only.
        let vec0 = UnitSet::of(&[Unit::Vec0]);
        let nodes = scheduler.nodes_where(&|i| i.opcode() == Opcode::Fmul);
        debug!("{}: restricting {} fmul to VEC0", Self::NAME, nodes.len());
        for node in nodes {
            scheduler.restrict_units(node, vec0);
        }
    }
}

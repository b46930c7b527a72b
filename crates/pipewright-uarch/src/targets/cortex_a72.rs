//! Arm Cortex-A72, front-end view: three instructions decoded per cycle feeding
//! two integer, two load/store and two ASIMD pipes.

use log::debug;
use pipewright_isa::{Arch, Instruction, Opcode, ARM_AARCH64};

use super::{feeds_accumulator, is_any_load, is_any_store};
use crate::error::Result;
use crate::latency::{Latency, Relation};
use crate::model::{CostModel, CostTables};
use crate::resolver::Key;
use crate::scheduler::Scheduler;
use crate::units::{execution_units, ExecutionUnit, UnitRequirement};

execution_units! {
    pub enum Unit {
        Int0 => "INT0",
        Int1 => "INT1",
        Mac => "MAC",
        Load0 => "LOAD0",
        Load1 => "LOAD1",
        Store0 => "STORE0",
        Store1 => "STORE1",
        Asimd0 => "ASIMD0",
        Asimd1 => "ASIMD1",
    }
}

/// Cost model of the Cortex-A72 front end.
#[derive(Debug, Clone)]
pub struct CortexA72Frontend {
    tables: CostTables,
}

impl CortexA72Frontend {
    /// Registry name.
    pub const NAME: &'static str = "Arm_Cortex_A72_frontend";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        let pair_store: &[&[Unit]] = &[&[Unit::Store0], &[Unit::Store1]];
        let units = units
            .rule(Opcode::Stp, UnitRequirement::all(pair_store))
            .rule(Key::pred(Instruction::is_vector_mul), UnitRequirement::any(&[Unit::Asimd0]))
            .rule(
                Key::pred(Instruction::is_vector_add_sub),
                UnitRequirement::any(&[Unit::Asimd0, Unit::Asimd1]),
            )
            .rule(Opcode::MulX, UnitRequirement::any(&[Unit::Mac]))
            .rule(Key::pred(is_any_load), UnitRequirement::any(&[Unit::Load0, Unit::Load1]))
            .rule(Key::pred(is_any_store), UnitRequirement::any(&[Unit::Store0, Unit::Store1]))
            .rule(
                Key::ops(&[Opcode::AddX, Opcode::Nop]),
                UnitRequirement::any(&[Unit::Int0, Unit::Int1]),
            );

        let inverse_throughput = inverse_throughput
            .rule(Key::pred(Instruction::is_vector_mul), 2)
            .rule(
                Key::any([
                    Key::pred(Instruction::is_vector_add_sub),
                    Key::pred(is_any_load),
                    Key::pred(is_any_store),
                    Key::ops(&[Opcode::MulX, Opcode::AddX, Opcode::Nop]),
                ]),
                1,
            );

        let latency = latency
            .rule(Key::ops(&[Opcode::MulV, Opcode::Mla, Opcode::Ldr]), 5)
            .rule(Key::any([Opcode::Fmul.into(), Key::pred(is_any_load)]), 4)
            .rule(Key::ops(&[Opcode::AddV, Opcode::SubV, Opcode::MulX]), 3)
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

impl Default for CortexA72Frontend {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for CortexA72Frontend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arch(&self) -> &'static Arch {
        &ARM_AARCH64
    }

    fn issue_rate(&self) -> u32 {
        3
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
        // Late accumulator forwarding between chained multiply-accumulates.
        if src.opcode() == Opcode::Mla && feeds_accumulator(src, output_index, dst) {
            return Ok(Latency::Cycles(2));
        }
        Ok(Latency::Cycles(base))
    }

    fn add_further_constraints(&self, scheduler: &mut dyn Scheduler) {
        let pairs = scheduler.pairs_where(&|a, b| a.is_vector_mul() && b.is_vector_mul());
        debug!("{}: separating {} multiply pairs", Self::NAME, pairs.len());
        for (first, second) in pairs {
            scheduler.add_relation(first, second, Relation::NotAdjacent);
        }
    }
}

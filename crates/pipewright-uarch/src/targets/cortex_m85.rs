//! Arm Cortex-M85: dual-issue Helium core. Vector stores need both the store
//! port and the scalar address generator in the same cycle.

use log::debug;
use pipewright_isa::{Arch, Instruction, Opcode, ARM_V81M};

use super::{is_any_load, is_any_store, is_float_vector_op};
use crate::error::Result;
use crate::latency::{Latency, Relation};
use crate::model::{CostModel, CostTables};
use crate::resolver::Key;
use crate::scheduler::{Objective, ObjectiveTerm, Scheduler, Sense};
use crate::units::{execution_units, ExecutionUnit, UnitRequirement};

execution_units! {
    pub enum Unit {
        Alu0 => "ALU0",
        Alu1 => "ALU1",
        Agu => "AGU",
        Load => "LOAD",
        Store => "STORE",
        VecInt => "VEC_INT",
        VecMul => "VEC_MUL",
        VecFp => "VEC_FP",
    }
}

/// Cost model of the Cortex-M85.
#[derive(Debug, Clone)]
pub struct CortexM85 {
    tables: CostTables,
}

impl CortexM85 {
    /// Registry name.
    pub const NAME: &'static str = "Arm_Cortex_M85";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        let store_ports: &[&[Unit]] = &[&[Unit::Store], &[Unit::Agu]];
        let units = units
            .rule(Key::pred(is_float_vector_op), UnitRequirement::any(&[Unit::VecFp]))
            .rule(Key::pred(Instruction::is_vector_mul), UnitRequirement::any(&[Unit::VecMul]))
            .rule(Key::pred(Instruction::is_vector_add_sub), UnitRequirement::any(&[Unit::VecInt]))
            .rule(Opcode::Vstrw, UnitRequirement::all(store_ports))
            .rule(Key::pred(is_any_load), UnitRequirement::any(&[Unit::Load]))
            .rule(Key::pred(is_any_store), UnitRequirement::any(&[Unit::Store]))
            .rule(
                Key::ops(&[Opcode::Add, Opcode::Nop]),
                UnitRequirement::any(&[Unit::Alu0, Unit::Alu1]),
            );

        let inverse_throughput = inverse_throughput
            .rule(Key::pred(Instruction::is_vector_mul), 2)
            .rule(
                Key::any([
                    Key::pred(Instruction::is_vector_add_sub),
                    Key::pred(is_any_load),
                    Key::pred(is_any_store),
                    Key::ops(&[Opcode::Add, Opcode::Nop]),
                ]),
                1,
            );

        let latency = latency
            .rule(Key::pred(is_float_vector_op), 3)
            .rule(Key::pred(Instruction::is_vector_mul), 3)
            .rule(Key::pred(Instruction::is_vector_add_sub), 2)
            .rule(Key::pred(is_any_load), 3)
            .rule(Key::pred(is_any_store), 1)
            .rule(Key::ops(&[Opcode::Add, Opcode::Nop]), 1);

        Self {
            tables: CostTables {
                units,
                inverse_throughput,
                latency,
            },
        }
    }
}

impl Default for CortexM85 {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for CortexM85 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arch(&self) -> &'static Arch {
        &ARM_V81M
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
        let _ = output_index;
        let base = self.base_latency(src)?;
        if src.opcode() == Opcode::Vstrw && dst.opcode() == Opcode::Vstrw {
            return Ok(Latency::Paired {
                cycles: base,
                relation: Relation::Apart(2),
            });
        }
        Ok(Latency::Cycles(base))
    }

    fn add_further_constraints(&self, scheduler: &mut dyn Scheduler) {
        // The store buffer drains one entry per cycle.
        let pairs = scheduler.pairs_where(&|a, b| is_any_store(a) && is_any_store(b));
        debug!("{}: spacing {} store pairs", Self::NAME, pairs.len());
        for (first, second) in pairs {
            scheduler.add_relation(first, second, Relation::Apart(1));
        }
    }

    fn get_min_max_objective(&self) -> Option<Objective> {
        Some(Objective {
            name: "load-to-multiply adjacency",
            sense: Sense::Minimize,
            term: ObjectiveTerm::AdjacentPairs {
                first: Instruction::is_vector_load,
                second: Instruction::is_vector_mul,
            },
        })
    }
}

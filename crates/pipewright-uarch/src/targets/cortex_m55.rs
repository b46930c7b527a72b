//! Arm Cortex-M55: single-issue Helium core processing 128-bit vectors in two
//! beats.

use pipewright_isa::{Arch, Instruction, Opcode, ARM_V81M};

use super::{feeds_accumulator, is_any_load, is_any_store, is_float_vector_op};
use crate::error::Result;
use crate::latency::{Latency, Relation};
use crate::model::{CostModel, CostTables};
use crate::resolver::Key;
use crate::units::{execution_units, ExecutionUnit, UnitRequirement};

execution_units! {
    pub enum Unit {
        Scalar => "SCALAR",
        Load => "LOAD",
        Store => "STORE",
        VecInt => "VEC_INT",
        VecMul => "VEC_MUL",
        VecFpAdd => "VEC_FPADD",
        VecFpMul => "VEC_FPMUL",
    }
}

fn is_float_mul(inst: &Instruction) -> bool {
    inst.is_float() && inst.is_vector_mul()
}

/// Cost model of the Cortex-M55.
#[derive(Debug, Clone)]
pub struct CortexM55 {
    tables: CostTables,
}

impl CortexM55 {
    /// Registry name.
    pub const NAME: &'static str = "Arm_Cortex_M55";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        let units = units
            .rule(Key::pred(is_float_mul), UnitRequirement::any(&[Unit::VecFpMul]))
            .rule(Key::pred(is_float_vector_op), UnitRequirement::any(&[Unit::VecFpAdd]))
            .rule(Key::pred(Instruction::is_vector_mul), UnitRequirement::any(&[Unit::VecMul]))
            .rule(Key::pred(Instruction::is_vector_add_sub), UnitRequirement::any(&[Unit::VecInt]))
            .rule(Key::pred(is_any_load), UnitRequirement::any(&[Unit::Load]))
            .rule(Key::pred(is_any_store), UnitRequirement::any(&[Unit::Store]))
            .rule(Key::ops(&[Opcode::Add, Opcode::Nop]), UnitRequirement::any(&[Unit::Scalar]));

        // Beat-wise execution: every 128-bit operation holds its unit for two ticks.
        let inverse_throughput = inverse_throughput
            .rule(
                Key::any([
                    Key::pred(Instruction::is_vector_mul),
                    Key::pred(Instruction::is_vector_add_sub),
                    Opcode::Vldrw.into(),
                    Opcode::Vstrw.into(),
                ]),
                2,
            )
            .rule(
                Key::any([
                    Key::pred(Instruction::is_stack_access),
                    Key::ops(&[Opcode::Add, Opcode::Nop]),
                ]),
                1,
            );

        let latency = latency
            .rule(Key::pred(is_float_mul), 3)
            .rule(Key::pred(is_float_vector_op), 2)
            .rule(Key::pred(Instruction::is_vector_mul), 2)
            .rule(Key::pred(Instruction::is_vector_add_sub), 1)
            .rule(Key::pred(is_any_load), 2)
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

impl Default for CortexM55 {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for CortexM55 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arch(&self) -> &'static Arch {
        &ARM_V81M
    }

    fn issue_rate(&self) -> u32 {
        1
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
        if feeds_accumulator(src, output_index, dst) {
            // Back-to-back accumulation overlaps the beats of both instructions.
            if src.opcode() == Opcode::Vmla {
                return Ok(Latency::Paired {
                    cycles: 2,
                    relation: Relation::Exactly(2),
                });
            }
            if src.is_vector_mul() && !src.is_float() {
                return Ok(Latency::Cycles(1));
            }
        }
        Ok(Latency::Cycles(base))
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_as;
    use super::*;

    #[test]
    fn multiply_forwards_into_accumulator() {
        let model = CortexM55::new();
        let mul = parse_as(&ARM_V81M, "vmul.s32 q0, q1, q2", Opcode::Vmul);
        let mla = parse_as(&ARM_V81M, "vmla.s32 q0, q3, r1", Opcode::Vmla);
        let other = parse_as(&ARM_V81M, "vmla.s32 q4, q3, r1", Opcode::Vmla);

        assert_eq!(model.base_latency(&mul).unwrap(), 2);
        assert_eq!(model.get_latency(&mul, 0, &mla).unwrap(), Latency::Cycles(1));
        assert_eq!(model.get_latency(&mul, 0, &other).unwrap(), Latency::Cycles(2));
    }

    #[test]
    fn chained_accumulation_is_paired() {
        let model = CortexM55::new();
        let first = parse_as(&ARM_V81M, "vmla.s32 q0, q1, r1", Opcode::Vmla);
        let second = parse_as(&ARM_V81M, "vmla.s32 q0, q2, r2", Opcode::Vmla);
        let latency = model.get_latency(&first, 0, &second).unwrap();
        assert_eq!(latency.relation(), Some(Relation::Exactly(2)));
        assert_eq!(latency.cycles(), 2);
    }

    #[test]
    fn float_multiply_uses_fp_unit() {
        let model = CortexM55::new();
        let fmul = parse_as(&ARM_V81M, "vmul.f32 q0, q1, q2", Opcode::Vmul);
        let imul = parse_as(&ARM_V81M, "vmul.i32 q0, q1, q2", Opcode::Vmul);
        assert_eq!(
            model.get_units(&fmul).unwrap(),
            &UnitRequirement::any(&[Unit::VecFpMul])
        );
        assert_eq!(
            model.get_units(&imul).unwrap(),
            &UnitRequirement::any(&[Unit::VecMul])
        );
        assert_eq!(model.base_latency(&fmul).unwrap(), 3);
    }
}

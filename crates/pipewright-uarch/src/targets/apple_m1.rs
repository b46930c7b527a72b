//! Apple M1 performance (Firestorm) and efficiency (Icestorm) cores.

use pipewright_isa::{Arch, Instruction, Opcode, ARM_AARCH64};

use super::{is_any_load, is_any_store};
use crate::model::{CostModel, CostTables};
use crate::resolver::Key;
use crate::scheduler::{Objective, ObjectiveTerm, Sense};
use crate::units::{execution_units, ExecutionUnit, UnitRequirement};

execution_units! {
    pub enum FirestormUnit {
        Alu0 => "ALU0",
        Alu1 => "ALU1",
        Alu2 => "ALU2",
        Alu3 => "ALU3",
        Load0 => "LOAD0",
        Load1 => "LOAD1",
        Store => "STORE",
        Vec0 => "VEC0",
        Vec1 => "VEC1",
        Vec2 => "VEC2",
        Vec3 => "VEC3",
    }
}

execution_units! {
    pub enum IcestormUnit {
        Alu0 => "ALU0",
        Alu1 => "ALU1",
        LoadStore => "LS",
        Vec0 => "VEC0",
        Vec1 => "VEC1",
    }
}

fn is_vector_arith(inst: &Instruction) -> bool {
    inst.is_vector_mul() || inst.is_vector_add_sub()
}

/// Eight-wide performance core.
#[derive(Debug, Clone)]
pub struct AppleM1Firestorm {
    tables: CostTables,
}

impl AppleM1Firestorm {
    /// Registry name.
    pub const NAME: &'static str = "Apple_M1_firestorm";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        use FirestormUnit::*;

        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        let units = units
            .rule(Key::pred(is_vector_arith), UnitRequirement::any(&[Vec0, Vec1, Vec2, Vec3]))
            .rule(Opcode::MulX, UnitRequirement::any(&[Alu2, Alu3]))
            .rule(Key::pred(is_any_load), UnitRequirement::any(&[Load0, Load1]))
            .rule(Key::pred(is_any_store), UnitRequirement::any(&[Store]))
            .rule(
                Key::ops(&[Opcode::AddX, Opcode::Nop]),
                UnitRequirement::any(&[Alu0, Alu1, Alu2, Alu3]),
            );

        let inverse_throughput = inverse_throughput.rule(
            Key::any([
                Key::pred(is_vector_arith),
                Key::pred(is_any_load),
                Key::pred(is_any_store),
                Key::ops(&[Opcode::MulX, Opcode::AddX, Opcode::Nop]),
            ]),
            1,
        );

        let latency = latency
            .rule(Key::any([Opcode::Fmul.into(), Key::pred(is_any_load)]), 4)
            .rule(Key::ops(&[Opcode::MulV, Opcode::Mla, Opcode::MulX]), 3)
            .rule(Key::ops(&[Opcode::AddV, Opcode::SubV]), 2)
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

impl Default for AppleM1Firestorm {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for AppleM1Firestorm {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arch(&self) -> &'static Arch {
        &ARM_AARCH64
    }

    fn issue_rate(&self) -> u32 {
        8
    }

    fn unit_names(&self) -> &'static [&'static str] {
        FirestormUnit::NAMES
    }

    fn tables(&self) -> &CostTables {
        &self.tables
    }
}

/// Four-wide efficiency core with a single load/store pipe.
#[derive(Debug, Clone)]
pub struct AppleM1Icestorm {
    tables: CostTables,
}

impl AppleM1Icestorm {
    /// Registry name.
    pub const NAME: &'static str = "Apple_M1_icestorm";

    /// Build the model with its tables filled in.
    pub fn new() -> Self {
        use IcestormUnit::*;

        let CostTables {
            units,
            inverse_throughput,
            latency,
        } = CostTables::new(Self::NAME);

        let units = units
            .rule(Key::pred(is_vector_arith), UnitRequirement::any(&[Vec0, Vec1]))
            .rule(Opcode::MulX, UnitRequirement::any(&[Alu1]))
            .rule(
                Key::any([Key::pred(is_any_load), Key::pred(is_any_store)]),
                UnitRequirement::any(&[LoadStore]),
            )
            .rule(Key::ops(&[Opcode::AddX, Opcode::Nop]), UnitRequirement::any(&[Alu0, Alu1]));

        let inverse_throughput = inverse_throughput
            .rule(Key::ops(&[Opcode::Stp, Opcode::MulX]), 2)
            .rule(
                Key::any([
                    Key::pred(is_vector_arith),
                    Key::pred(is_any_load),
                    Key::pred(is_any_store),
                    Key::ops(&[Opcode::AddX, Opcode::Nop]),
                ]),
                1,
            );

        let latency = latency
            .rule(
                Key::any([
                    Key::ops(&[Opcode::MulV, Opcode::Mla, Opcode::Fmul]),
                    Key::pred(is_any_load),
                ]),
                4,
            )
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

impl Default for AppleM1Icestorm {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for AppleM1Icestorm {
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
        IcestormUnit::NAMES
    }

    fn tables(&self) -> &CostTables {
        &self.tables
    }

    fn get_min_max_objective(&self) -> Option<Objective> {
        Some(Objective {
            name: "store pair adjacency",
            sense: Sense::Minimize,
            term: ObjectiveTerm::AdjacentPairs {
                first: is_any_store,
                second: is_any_store,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_as;
    use super::*;
    use crate::latency::Latency;

    #[test]
    fn firestorm_has_no_overrides() {
        let model = AppleM1Firestorm::new();
        let mla = parse_as(&ARM_AARCH64, "mla v0, v1, v2", Opcode::Mla);
        let next = parse_as(&ARM_AARCH64, "mla v0, v3, v4", Opcode::Mla);
        assert_eq!(model.get_latency(&mla, 0, &next).unwrap(), Latency::Cycles(3));
        assert!(!model.has_min_max_objective());
    }

    #[test]
    fn icestorm_shares_memory_pipe() {
        let model = AppleM1Icestorm::new();
        let load = parse_as(&ARM_AARCH64, "ldr x0, [x1]", Opcode::LdrX);
        let store = parse_as(&ARM_AARCH64, "str v0, [x1]", Opcode::Str);
        assert_eq!(model.get_units(&load).unwrap(), model.get_units(&store).unwrap());
        assert_eq!(
            model.unit_names()[usize::from(IcestormUnit::LoadStore.index())],
            "LS"
        );
    }

    #[test]
    fn icestorm_objective_counts_adjacent_stores() {
        let model = AppleM1Icestorm::new();
        let objective = model.get_min_max_objective().unwrap();
        let load = parse_as(&ARM_AARCH64, "ldr x0, [x1]", Opcode::LdrX);
        let store = parse_as(&ARM_AARCH64, "str x2, [x3]", Opcode::StrX);
        let spill = parse_as(&ARM_AARCH64, "vsave VSTACK0, v1", Opcode::Vsave);
        assert_eq!(objective.evaluate(&[(0, &store), (1, &spill)]), 1);
        assert_eq!(objective.evaluate(&[(0, &store), (1, &load), (2, &spill)]), 0);
    }
}

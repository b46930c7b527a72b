//! Target registry: maps target names to their cost models.

use std::sync::OnceLock;

use log::debug;

use crate::error::{CostError, Result};
use crate::model::CostModel;
use crate::targets::{
    AppleM1Firestorm, AppleM1Icestorm, CortexA55, CortexA72Frontend, CortexM55, CortexM85,
    NeoverseN1,
};

fn registry() -> &'static [Box<dyn CostModel>] {
    static MODELS: OnceLock<Vec<Box<dyn CostModel>>> = OnceLock::new();
    MODELS.get_or_init(|| {
        let models: Vec<Box<dyn CostModel>> = vec![
            Box::new(CortexM55::new()),
            Box::new(CortexM85::new()),
            Box::new(CortexA55::new()),
            Box::new(CortexA72Frontend::new()),
            Box::new(NeoverseN1::new()),
            Box::new(AppleM1Firestorm::new()),
            Box::new(AppleM1Icestorm::new()),
        ];
        debug!("registered {} cost models", models.len());
        models
    })
}

/// Names of all registered targets.
pub fn list_targets() -> Vec<&'static str> {
    registry().iter().map(|m| m.name()).collect()
}

/// Look up a target by its exact name.
pub fn get_target(name: &str) -> Result<&'static dyn CostModel> {
    registry()
        .iter()
        .find(|m| m.name() == name)
        .map(|m| &**m)
        .ok_or_else(|| CostError::UnknownTarget {
            name: name.to_string(),
            valid: list_targets().join(", "),
        })
}

/// Targets that model the dialect `arch`.
pub fn targets_for_arch(arch: &str) -> Vec<&'static dyn CostModel> {
    registry()
        .iter()
        .filter(|m| m.arch().name == arch)
        .map(|m| &**m)
        .collect()
}

#[cfg(test)]
mod tests {
    use pipewright_isa::{parse_line, variant_lines, Instruction};

    use super::*;
    use crate::latency::Latency;

    /// One parsed instance per variant and datatype suffix of the target's
    /// dialect.
    fn every_instance(model: &dyn CostModel) -> Vec<Instruction> {
        let arch = model.arch();
        arch.defs()
            .iter()
            .flat_map(|def| {
                variant_lines(arch, def).into_iter().map(move |line| {
                    parse_line(arch, &line)
                        .unwrap()
                        .into_iter()
                        .find(|i| i.opcode() == def.opcode)
                        .unwrap_or_else(|| panic!("{line} did not parse as {}", def.name))
                })
            })
            .collect()
    }

    #[test]
    fn lists_all_targets() {
        assert_eq!(
            list_targets(),
            vec![
                "Arm_Cortex_M55",
                "Arm_Cortex_M85",
                "Arm_Cortex_A55",
                "Arm_Cortex_A72_frontend",
                "Arm_Neoverse_N1",
                "Apple_M1_firestorm",
                "Apple_M1_icestorm",
            ]
        );
    }

    #[test]
    fn unknown_target_lists_choices() {
        let err = get_target("Arm_Cortex_M4").err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("Arm_Cortex_M4"));
        assert!(msg.contains("Apple_M1_icestorm"));
        assert!(matches!(err, CostError::UnknownTarget { .. }));
    }

    #[test]
    fn targets_grouped_by_dialect() {
        let m: Vec<_> = targets_for_arch("Arm_v81M").iter().map(|t| t.name()).collect();
        assert_eq!(m, vec!["Arm_Cortex_M55", "Arm_Cortex_M85"]);
        assert_eq!(targets_for_arch("Arm_AArch64").len(), 5);
        assert!(targets_for_arch("x86").is_empty());
    }

    #[test]
    fn every_table_covers_every_variant() {
        for model in registry() {
            let program = every_instance(&**model);
            assert!(program.iter().any(Instruction::is_float), "{}", model.name());
            for src in &program {
                model
                    .get_units(src)
                    .unwrap_or_else(|e| panic!("{}: {e}", model.name()));
                let inv = model.get_inverse_throughput(src).unwrap();
                assert!(inv >= 1, "{}: {src}", model.name());
                for dst in &program {
                    for index in 0..src.def().written_count().max(1) {
                        model
                            .get_latency(src, index, dst)
                            .unwrap_or_else(|e| panic!("{}: {e}", model.name()));
                    }
                }
            }
        }
    }

    #[test]
    fn unit_requirements_name_declared_units() {
        for model in registry() {
            let count = model.unit_names().len();
            for inst in every_instance(&**model) {
                for set in model.get_units(&inst).unwrap().sets() {
                    assert!(!set.is_empty(), "{}: {inst}", model.name());
                    assert!(set.indices().all(|i| usize::from(i) < count));
                }
            }
        }
    }

    #[test]
    fn issue_rates() {
        let rates: Vec<u32> = registry().iter().map(|m| m.issue_rate()).collect();
        assert_eq!(rates, vec![1, 2, 2, 3, 4, 8, 4]);
    }

    #[test]
    fn forwarding_paths_beat_baseline() {
        for name in ["Arm_Cortex_M55", "Arm_Cortex_A55"] {
            let model = get_target(name).unwrap();
            let program = every_instance(model);
            let mul = program
                .iter()
                .find(|i| i.is_vector_mul() && !i.is_multiply_accumulate() && !i.is_float())
                .unwrap();
            let mla = program.iter().find(|i| i.is_multiply_accumulate()).unwrap();
            // Canonical operands put the multiply result and the accumulator in
            // the same register.
            assert_eq!(mul.written(0), mla.in_outs().first().map(String::as_str));
            let forwarded = model.get_latency(mul, 0, mla).unwrap();
            assert!(matches!(forwarded, Latency::Cycles(_)));
            assert!(forwarded.cycles() < model.base_latency(mul).unwrap(), "{name}");
        }
    }
}

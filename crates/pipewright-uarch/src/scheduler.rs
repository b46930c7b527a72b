//! Narrow interface into the external scheduler.
//!
//! Cost models never see the scheduler's internal representation. They can
//! enumerate the instructions it is placing, add relations between two of
//! them, and shrink the set of units an instruction may use.

use log::debug;
use serde::{Deserialize, Serialize};

use pipewright_isa::Instruction;

use crate::latency::Relation;
use crate::model::CostModel;
use crate::resolver::Predicate;
use crate::units::UnitSet;

/// Handle of one instruction inside the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Capabilities the scheduler exposes to target hooks.
pub trait Scheduler {
    /// All nodes, in program order.
    fn nodes(&self) -> Vec<NodeId>;

    fn instruction(&self, node: NodeId) -> &Instruction;

    /// Require `relation` between the issue cycles of `first` and `second`.
    fn add_relation(&mut self, first: NodeId, second: NodeId, relation: Relation);

    /// Limit `node` to the units in `units`.
    fn restrict_units(&mut self, node: NodeId, units: UnitSet);

    /// Nodes whose instruction satisfies `pred`.
    fn nodes_where(&self, pred: &dyn Fn(&Instruction) -> bool) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|&n| pred(self.instruction(n)))
            .collect()
    }

    /// Ordered pairs of distinct nodes, `first` preceding `second` in program
    /// order, that satisfy `pred`.
    fn pairs_where(
        &self,
        pred: &dyn Fn(&Instruction, &Instruction) -> bool,
    ) -> Vec<(NodeId, NodeId)> {
        let nodes = self.nodes();
        let mut pairs = Vec::new();
        for (i, &first) in nodes.iter().enumerate() {
            for &second in &nodes[i + 1..] {
                if pred(self.instruction(first), self.instruction(second)) {
                    pairs.push((first, second));
                }
            }
        }
        pairs
    }
}

/// What the scheduler is optimizing for in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerMode {
    /// Full performance model.
    #[default]
    Performance,
    /// Only functional correctness; performance constraints are skipped.
    FunctionalOnly,
}

/// Direction of a secondary objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Quantity a secondary objective measures.
#[derive(Clone, Copy)]
pub enum ObjectiveTerm {
    /// Number of consecutive-cycle pairs whose earlier instruction satisfies
    /// `first` and whose later one satisfies `second`.
    AdjacentPairs { first: Predicate, second: Predicate },
}

impl std::fmt::Debug for ObjectiveTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveTerm::AdjacentPairs { .. } => write!(f, "AdjacentPairs"),
        }
    }
}

/// Secondary objective contributed by a target.
#[derive(Debug, Clone, Copy)]
pub struct Objective {
    /// Short label for logs.
    pub name: &'static str,
    pub sense: Sense,
    pub term: ObjectiveTerm,
}

impl Objective {
    /// Evaluate the objective term on a finished schedule given as
    /// `(issue cycle, instruction)` pairs.
    pub fn evaluate(&self, schedule: &[(i64, &Instruction)]) -> usize {
        match self.term {
            ObjectiveTerm::AdjacentPairs { first, second } => schedule
                .iter()
                .flat_map(|a| schedule.iter().map(move |b| (a, b)))
                .filter(|((ta, a), (tb, b))| *tb == ta + 1 && first(a) && second(b))
                .count(),
        }
    }

    /// Whether a schedule scoring `candidate` beats one scoring `incumbent`.
    pub fn improves(&self, candidate: usize, incumbent: usize) -> bool {
        match self.sense {
            Sense::Minimize => candidate < incumbent,
            Sense::Maximize => candidate > incumbent,
        }
    }
}

/// Run the target's structural-constraint hook unless the run is
/// functional-only.
pub fn apply_further_constraints(
    model: &dyn CostModel,
    scheduler: &mut dyn Scheduler,
    mode: OptimizerMode,
) {
    if mode == OptimizerMode::FunctionalOnly {
        debug!("{}: functional-only run, skipping target constraints", model.name());
        return;
    }
    model.add_further_constraints(scheduler);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Scheduler double that records every hook call.
    #[derive(Debug, Default)]
    pub struct RecordingScheduler {
        pub instructions: Vec<Instruction>,
        pub relations: Vec<(NodeId, NodeId, Relation)>,
        pub restrictions: Vec<(NodeId, UnitSet)>,
    }

    impl RecordingScheduler {
        pub fn new(instructions: Vec<Instruction>) -> Self {
            Self {
                instructions,
                ..Default::default()
            }
        }
    }

    impl Scheduler for RecordingScheduler {
        fn nodes(&self) -> Vec<NodeId> {
            (0..self.instructions.len()).map(NodeId).collect()
        }

        fn instruction(&self, node: NodeId) -> &Instruction {
            &self.instructions[node.0]
        }

        fn add_relation(&mut self, first: NodeId, second: NodeId, relation: Relation) {
            self.relations.push((first, second, relation));
        }

        fn restrict_units(&mut self, node: NodeId, units: UnitSet) {
            self.restrictions.push((node, units));
        }
    }
}

#[cfg(test)]
mod tests {
    use pipewright_isa::{parse_line, Opcode, ARM_AARCH64};

    use super::testing::RecordingScheduler;
    use super::*;

    fn inst(line: &str) -> Instruction {
        parse_line(&ARM_AARCH64, line).unwrap().remove(0)
    }

    #[test]
    fn pairs_follow_program_order() {
        let sched = RecordingScheduler::new(vec![
            inst("mul v0, v1, v2"),
            inst("nop"),
            inst("mul v3, v4, v5"),
        ]);
        let pairs = sched.pairs_where(&|a, b| a.is_vector_mul() && b.is_vector_mul());
        assert_eq!(pairs, vec![(NodeId(0), NodeId(2))]);
        let muls = sched.nodes_where(&|i| i.opcode() == Opcode::MulV);
        assert_eq!(muls, vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn adjacent_pair_objective() {
        let objective = Objective {
            name: "test",
            sense: Sense::Minimize,
            term: ObjectiveTerm::AdjacentPairs {
                first: Instruction::is_load,
                second: Instruction::is_vector_mul,
            },
        };
        let load = inst("ldr v0, [x1]");
        let mul = inst("mul v2, v0, v0");
        let nop = inst("nop");
        assert_eq!(objective.evaluate(&[(0, &load), (1, &mul), (2, &nop)]), 1);
        assert_eq!(objective.evaluate(&[(0, &load), (2, &mul)]), 0);
        assert_eq!(objective.evaluate(&[(0, &mul), (1, &load)]), 0);
    }

    #[test]
    fn sense_orders_scores() {
        let mut objective = Objective {
            name: "test",
            sense: Sense::Minimize,
            term: ObjectiveTerm::AdjacentPairs {
                first: Instruction::is_store,
                second: Instruction::is_store,
            },
        };
        let store = inst("str x0, [x1]");
        let nop = inst("nop");
        let packed = objective.evaluate(&[(0, &store), (1, &store)]);
        let spread = objective.evaluate(&[(0, &store), (1, &nop), (2, &store)]);
        assert!(objective.improves(spread, packed));
        assert!(!objective.improves(packed, packed));

        objective.sense = Sense::Maximize;
        assert!(objective.improves(packed, spread));
    }

    #[test]
    fn mode_defaults_to_performance() {
        assert_eq!(OptimizerMode::default(), OptimizerMode::Performance);
    }
}

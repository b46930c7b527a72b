//! The per-target cost model interface.
//!
//! Every target owns three ordered tables (execution units, inverse throughput
//! and baseline latency) and may refine the baseline latency with
//! forwarding or hazard rules that look at both instructions of a pair.

use pipewright_isa::{Arch, Instruction};

use crate::error::Result;
use crate::latency::Latency;
use crate::resolver::AttrTable;
use crate::scheduler::{Objective, Scheduler};
use crate::units::UnitRequirement;

/// The three lookup tables of a target.
#[derive(Debug, Clone)]
pub struct CostTables {
    /// Units each instruction occupies.
    pub units: AttrTable<UnitRequirement>,
    /// Cycles before the same units accept another instruction.
    pub inverse_throughput: AttrTable<u32>,
    /// Baseline producer latency, before pair-specific overrides.
    pub latency: AttrTable<u32>,
}

impl CostTables {
    /// Empty tables owned by target `owner`.
    pub fn new(owner: &'static str) -> Self {
        Self {
            units: AttrTable::new(owner, "execution_units"),
            inverse_throughput: AttrTable::new(owner, "inverse_throughput"),
            latency: AttrTable::new(owner, "latency"),
        }
    }
}

/// Cost model of one microarchitecture.
///
/// Queries are pure functions of their arguments and the immutable tables, so
/// a model can be shared freely between threads.
pub trait CostModel: Send + Sync {
    /// Registry name, e.g. `Arm_Cortex_M55`.
    fn name(&self) -> &'static str;

    /// Dialect whose instructions this model prices.
    fn arch(&self) -> &'static Arch;

    /// Maximum instructions dispatched per cycle.
    fn issue_rate(&self) -> u32;

    /// Names of this target's execution units, indexed like [`crate::UnitSet`].
    fn unit_names(&self) -> &'static [&'static str];

    /// Tables behind the default queries.
    fn tables(&self) -> &CostTables;

    /// Units `inst` occupies when it issues.
    fn get_units(&self, inst: &Instruction) -> Result<&UnitRequirement> {
        self.tables().units.resolve(inst)
    }

    /// Minimum spacing between two issues sharing the resolved entry.
    fn get_inverse_throughput(&self, inst: &Instruction) -> Result<u32> {
        self.tables().inverse_throughput.resolve(inst).copied()
    }

    /// Latency from output `output_index` of `src` to `dst`.
    ///
    /// The default is the baseline table entry of `src`; targets with
    /// forwarding paths or hazards override this.
    fn get_latency(
        &self,
        src: &Instruction,
        output_index: usize,
        dst: &Instruction,
    ) -> Result<Latency> {
        let _ = (output_index, dst);
        self.base_latency(src).map(Latency::Cycles)
    }

    /// Baseline latency of `src` before pair-specific rules.
    fn base_latency(&self, src: &Instruction) -> Result<u32> {
        self.tables().latency.resolve(src).copied()
    }

    /// Register structural rules the tables cannot express.
    fn add_further_constraints(&self, scheduler: &mut dyn Scheduler) {
        let _ = scheduler;
    }

    fn has_min_max_objective(&self) -> bool {
        self.get_min_max_objective().is_some()
    }

    fn get_min_max_objective(&self) -> Option<Objective> {
        None
    }
}

//! Microarchitecture cost models for the Pipewright scheduling cost layer.
//!
//! A cost model answers three questions about a parsed instruction:
//! - **Units:** which execution units it occupies, possibly several at once
//! - **Throughput:** how soon the same resource can accept another one
//! - **Latency:** how long until a consumer may read one of its outputs
//!
//! Targets may additionally install structural constraints into the external
//! scheduler and contribute a secondary objective.

pub mod config;
pub mod error;
pub mod latency;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod targets;
pub mod units;

pub use config::{load_config, parse_config, LoopSection, ModelConfig, Selection};
pub use error::{CostError, Result};
pub use latency::{Latency, Relation};
pub use model::{CostModel, CostTables};
pub use registry::{get_target, list_targets, targets_for_arch};
pub use resolver::{AttrTable, Key, Predicate};
pub use scheduler::{
    apply_further_constraints, NodeId, Objective, ObjectiveTerm, OptimizerMode, Scheduler, Sense,
};
pub use units::{ExecutionUnit, UnitRequirement, UnitSet};

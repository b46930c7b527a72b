//! Run configuration: which dialect, which target, which loop.
//!
//! Stored as TOML with kebab-case keys:
//!
//! ```toml
//! arch = "Arm_v81M"
//! target = "Arm_Cortex_M55"
//! mode = "functional-only"
//!
//! [loop]
//! label = "start"
//! ```

use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use pipewright_isa::{get_arch, Arch};

use crate::error::{CostError, Result};
use crate::model::CostModel;
use crate::registry::get_target;
use crate::scheduler::OptimizerMode;

/// Deserialized run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModelConfig {
    /// Dialect name, e.g. `Arm_v81M`.
    pub arch: String,
    /// Target name, e.g. `Arm_Cortex_M55`.
    pub target: String,
    #[serde(default)]
    pub mode: OptimizerMode,
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_section: Option<LoopSection>,
}

/// The `[loop]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoopSection {
    /// Label of the loop to extract.
    pub label: String,
}

/// A configuration resolved against the dialect and target registries.
pub struct Selection {
    pub arch: &'static Arch,
    pub target: &'static dyn CostModel,
    pub mode: OptimizerMode,
    pub loop_label: Option<String>,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("arch", &self.arch.name)
            .field("target", &self.target.name())
            .field("mode", &self.mode)
            .field("loop_label", &self.loop_label)
            .finish()
    }
}

impl ModelConfig {
    /// Look up the dialect and target, and check that they belong together.
    pub fn resolve(&self) -> Result<Selection> {
        let arch = get_arch(&self.arch)?;
        let target = get_target(&self.target)?;
        if target.arch().name != arch.name {
            return Err(CostError::ArchMismatch {
                target: self.target.clone(),
                expected: target.arch().name,
                found: self.arch.clone(),
            });
        }
        debug!("selected {} on {arch} ({:?})", target.name(), self.mode);
        Ok(Selection {
            arch,
            target,
            mode: self.mode,
            loop_label: self.loop_section.as_ref().map(|l| l.label.clone()),
        })
    }
}

/// Load a configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ModelConfig> {
    if !path.exists() {
        return Err(CostError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a configuration from a TOML string.
pub fn parse_config(toml_str: &str) -> Result<ModelConfig> {
    let config: ModelConfig = toml::from_str(toml_str)?;
    Ok(config)
}

//! Error types for cost-model lookups and configuration.

use std::path::PathBuf;

use pipewright_isa::IsaError;

/// Errors that can occur during cost-model operations.
#[derive(Debug, thiserror::Error)]
pub enum CostError {
    /// A cost table has no rule for an instruction the dialect can parse.
    #[error("{target}: no rule in table '{table}' for '{instruction}'")]
    NoRule {
        table: &'static str,
        target: &'static str,
        instruction: String,
    },

    /// Target name not in the registry.
    #[error("unknown target '{name}', valid choices: {valid}")]
    UnknownTarget { name: String, valid: String },

    /// A target was paired with an architecture it does not model.
    #[error("target '{target}' models {expected}, not {found}")]
    ArchMismatch {
        target: String,
        expected: &'static str,
        found: String,
    },

    #[error(transparent)]
    Isa(#[from] IsaError),

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file not found.
    #[error("configuration file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

/// Result type for cost-model operations.
pub type Result<T> = std::result::Result<T, CostError>;

//! Error types for parsing and loop extraction.

use std::fmt;

use crate::register::RegisterClass;

/// Why a single variant did not match a line.
///
/// Local to one trial: the parser records it and moves on to the next variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchFailure {
    /// The line's mnemonic differs from the variant's template.
    #[error("mnemonic '{found}' does not match '{expected}'")]
    Mnemonic { expected: String, found: String },

    /// The variant needs a datatype suffix and the line has none.
    #[error("missing datatype suffix, expected one of {allowed:?}")]
    MissingDataType { allowed: &'static [&'static str] },

    /// The suffix is not one the variant accepts.
    #[error("datatype suffix '{found}' not in {allowed:?}")]
    DataType {
        found: String,
        allowed: &'static [&'static str],
    },

    /// The line has a suffix but the variant takes none.
    #[error("unexpected datatype suffix '{found}'")]
    UnexpectedDataType { found: String },

    #[error("expected {expected} operands, found {found}")]
    OperandCount { expected: usize, found: usize },

    /// The token is not shaped like a register name.
    #[error("malformed operand '{token}'")]
    Operand { token: String },

    /// A register of the dialect, but not of the class `slot` requires.
    #[error("operand {slot} '{token}' is not a {expected} register")]
    RegisterClass {
        slot: usize,
        token: String,
        expected: RegisterClass,
    },

    #[error("malformed address: {detail}")]
    Address { detail: String },

    #[error("write-back and post-increment cannot be combined")]
    WritebackWithPostIndex,
}

/// A variant that was tried and the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Name of the variant.
    pub variant: &'static str,
    pub reason: MatchFailure,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variant, self.reason)
    }
}

/// Attempts rendered one per line for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempts(pub Vec<Attempt>);

impl fmt::Display for Attempts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attempt in &self.0 {
            write!(f, "\n  {attempt}")?;
        }
        Ok(())
    }
}

/// Errors from parsing, loop extraction, and architecture lookup.
#[derive(Debug, thiserror::Error)]
pub enum IsaError {
    /// No variant of the dialect parses the line.
    #[error("'{line}' is not a valid {arch} instruction; tried:{attempts}")]
    NoMatchingVariant {
        arch: &'static str,
        line: String,
        attempts: Attempts,
    },

    /// Operands do not fill the variant's slots exactly.
    #[error("{variant}: expected {expected} operands, found {found}")]
    OperandCount {
        variant: &'static str,
        expected: usize,
        found: usize,
    },

    /// A parse failure located in a multi-line listing.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<IsaError>,
    },

    #[error("loop label '{label}' not found")]
    LoopNotFound { label: String },

    #[error("loop '{label}' is not closed by a branch back to its label")]
    LoopNotClosed { label: String },

    #[error("unknown architecture '{name}', valid choices: {valid}")]
    UnknownArch { name: String, valid: String },
}

impl IsaError {
    /// Variants tried for a failed line, if this is a parse failure.
    pub fn attempts(&self) -> Option<&[Attempt]> {
        match self {
            IsaError::NoMatchingVariant { attempts, .. } => Some(&attempts.0),
            IsaError::AtLine { source, .. } => source.attempts(),
            _ => None,
        }
    }
}

/// Result type for ISA operations.
pub type Result<T> = std::result::Result<T, IsaError>;

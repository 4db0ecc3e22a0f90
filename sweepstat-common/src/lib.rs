use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Marker every export file name carries ahead of its target rate digits.
pub const RATE_MARKER: &str = "_qps_";

/// File name prefix the sweep uses for per-rate powerstat captures.
pub const POWERSTAT_PREFIX: &str = "powerstat_rate_";

/// Error types for the merge engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SweepStatError {
    #[error("Malformed export {path}: {reason}")]
    MalformedExport { path: String, reason: String },

    #[error("No input files found under {0}")]
    NoInputFilesFound(String),

    #[error("Sample count overflows group total when merging {0}")]
    CountOverflow(String),

    #[error("Group rate={rate} operation={operation} has no samples")]
    EmptyGroup { rate: u64, operation: Operation },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl SweepStatError {
    pub fn io(path: impl AsRef<std::path::Path>, err: impl fmt::Display) -> Self {
        SweepStatError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type for merge engine operations
pub type Result<T> = std::result::Result<T, SweepStatError>;

/// Operation class a distribution export measured.
///
/// Variants are declared in label order so the derived `Ord` sorts report
/// rows by label: `combined` < `read` < `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Combined,
    Read,
    Write,
}

impl Operation {
    pub fn as_name(&self) -> &'static str {
        match self {
            Operation::Combined => "combined",
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "combined" => Some(Operation::Combined),
            "read" => Some(Operation::Read),
            "write" => Some(Operation::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

/// Identity of one logical measurement: every export taken at the same target
/// rate for the same operation class merges into one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub rate: u64,
    pub operation: Operation,
}

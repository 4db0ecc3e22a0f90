use serde::Deserialize;
use std::path::Path;
use sweepstat_common::{Operation, Result, SweepStatError};

use crate::report::ExtraColumns;

/// Percentiles reported when none are configured.
pub const DEFAULT_PERCENTILES: [f64; 6] = [50.0, 90.0, 95.0, 99.0, 99.9, 99.99];

/// Extension of the per-process percentile-distribution exports.
pub const DEFAULT_EXTENSION: &str = "txt";

/// Report files are written as `<stem>[_<profile>].csv` and `.txt`.
pub const DEFAULT_OUTPUT_STEM: &str = "merged_percentiles";

/// One requested quantile, kept as the percent the user asked for so its
/// column label reads exactly as typed (`p99.9`, not `p99.90000000000001`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    percent: f64,
}

impl Quantile {
    pub fn from_percent(percent: f64) -> Result<Self> {
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(SweepStatError::InvalidConfig(format!(
                "percentile {percent} outside (0, 100]"
            )));
        }
        Ok(Self { percent })
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// The fraction in `(0, 1]` handed to the quantile walk.
    pub fn fraction(&self) -> f64 {
        self.percent / 100.0
    }

    pub fn label(&self) -> String {
        format!("p{}", self.percent)
    }
}

/// Merge settings, loadable from a JSON file. Every field is optional.
///
/// ```json
/// { "percentiles": [50, 99, 99.9], "extension": "txt", "with_throughput": true }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    pub percentiles: Vec<f64>,
    pub extension: String,
    pub output_stem: String,
    /// Only these operation groups are reported; empty means all.
    pub operations: Vec<Operation>,
    /// Join per-rate client log throughput onto report rows.
    pub with_throughput: bool,
    /// Join per-rate powerstat summaries onto report rows.
    pub with_power: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            extension: DEFAULT_EXTENSION.to_string(),
            output_stem: DEFAULT_OUTPUT_STEM.to_string(),
            operations: Vec::new(),
            with_throughput: false,
            with_power: false,
        }
    }
}

impl MergeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SweepStatError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SweepStatError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Validated quantile list, in configured order.
    pub fn quantiles(&self) -> Result<Vec<Quantile>> {
        if self.percentiles.is_empty() {
            return Err(SweepStatError::InvalidConfig("no percentiles requested".to_string()));
        }
        self.percentiles.iter().map(|&p| Quantile::from_percent(p)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        self.quantiles()?;
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(SweepStatError::InvalidConfig("export extension is empty".to_string()));
        }
        if self.output_stem.is_empty() || self.output_stem.contains(std::path::MAIN_SEPARATOR) {
            return Err(SweepStatError::InvalidConfig(format!(
                "output stem {:?} must be a plain file name",
                self.output_stem
            )));
        }
        Ok(())
    }

    pub fn extra_columns(&self) -> ExtraColumns {
        ExtraColumns { throughput: self.with_throughput, power: self.with_power }
    }

    pub fn wants(&self, operation: Operation) -> bool {
        self.operations.is_empty() || self.operations.contains(&operation)
    }
}

//! Summaries of the `powerstat` captures taken alongside each rate step.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use sweepstat_common::POWERSTAT_PREFIX;
use tracing::{debug, warn};

use crate::files::walk_files;

/// powerstat prints a preamble before its sample table.
const FIRST_SAMPLE_LINE: usize = 20;
/// Shorter captures are runs that died before sampling started.
const MIN_LINES: usize = 25;
const IDLE_COLUMN: usize = 4;
const WATTS_COLUMN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSummary {
    pub mean_watts: f64,
    /// Population standard deviation.
    pub stddev_watts: f64,
    /// `100 - mean idle %`.
    pub cpu_busy_pct: f64,
}

/// Summarise one powerstat capture, or `None` if it holds no usable samples.
pub fn parse_powerstat(contents: &str) -> Option<PowerSummary> {
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < MIN_LINES {
        return None;
    }

    let mut idle = Vec::new();
    let mut watts = Vec::new();
    for line in lines[FIRST_SAMPLE_LINE..].iter().take_while(|l| !l.starts_with('-')) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() <= WATTS_COLUMN {
            continue;
        }
        if let (Ok(i), Ok(w)) = (cols[IDLE_COLUMN].parse::<f64>(), cols[WATTS_COLUMN].parse::<f64>()) {
            idle.push(i);
            watts.push(w);
        }
    }
    if watts.is_empty() {
        return None;
    }

    let mean_watts = mean(&watts);
    let variance = watts.iter().map(|w| (w - mean_watts).powi(2)).sum::<f64>() / watts.len() as f64;
    Some(PowerSummary {
        mean_watts,
        stddev_watts: variance.sqrt(),
        cpu_busy_pct: 100.0 - mean(&idle),
    })
}

/// Rate encoded in a `powerstat_rate_<rate>.txt` file name.
pub fn rate_from_file_name(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix(POWERSTAT_PREFIX)?
        .strip_suffix(".txt")?
        .parse()
        .ok()
}

/// Find and summarise every powerstat capture under `root`, keyed by rate.
/// Unreadable or empty captures are skipped.
pub fn collect(root: &Path) -> BTreeMap<u64, PowerSummary> {
    let paths = match walk_files(root) {
        Ok(paths) => paths,
        Err(error) => {
            warn!(%error, "cannot search for powerstat captures");
            return BTreeMap::new();
        }
    };

    let mut by_rate = BTreeMap::new();
    for path in paths {
        let Some(rate) = path.file_name().and_then(|n| n.to_str()).and_then(rate_from_file_name) else {
            continue;
        };
        if by_rate.contains_key(&rate) {
            warn!(path = %path.display(), rate, "ignoring duplicate powerstat capture");
            continue;
        }
        let summary = match fs::read_to_string(&path) {
            Ok(contents) => parse_powerstat(&contents),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable powerstat capture");
                continue;
            }
        };
        match summary {
            Some(s) => {
                debug!(rate, watts = s.mean_watts, "powerstat summary");
                by_rate.insert(rate, s);
            }
            None => warn!(path = %path.display(), "powerstat capture has no samples"),
        }
    }
    by_rate
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

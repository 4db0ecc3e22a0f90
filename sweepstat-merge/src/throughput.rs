//! Achieved throughput read from the load generators' client logs.
//!
//! memtier ends each client log with a `Totals` row whose second column is
//! ops/sec, and reports misses on a `Misses ... = N` line. mutilate prints
//! `Total QPS = N` instead. Every client log at one target rate adds to that
//! rate's throughput.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use sweepstat_common::RATE_MARKER;
use tracing::{debug, warn};

use crate::files::walk_files;

/// Extension of client logs.
pub const LOG_EXTENSION: &str = ".log";

const MEMTIER_TOTALS: &str = "Totals";
const MUTILATE_QPS: &str = "Total QPS =";

/// What one client log reports. The last matching line of each kind wins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientLog {
    pub ops_per_sec: Option<f64>,
    pub misses: Option<f64>,
}

/// Sum over every client log for one rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputSummary {
    /// Achieved operations per second across all clients.
    pub qps: f64,
    /// `None` when no client reported misses.
    pub misses: Option<f64>,
    /// Client logs that reported throughput.
    pub logs: usize,
}

pub fn parse_client_log(contents: &str) -> ClientLog {
    let mut log = ClientLog::default();
    for line in contents.lines() {
        if line.starts_with(MEMTIER_TOTALS) {
            if let Some(ops) = line.split_whitespace().nth(1).and_then(|t| t.parse().ok()) {
                log.ops_per_sec = Some(ops);
            }
        }
        if let Some((_, rest)) = line.split_once(MUTILATE_QPS) {
            if let Some(qps) = rest.split_whitespace().next().and_then(|t| t.parse().ok()) {
                log.ops_per_sec = Some(qps);
            }
        }
        if line.contains("Misses") {
            let misses = line
                .split_once('=')
                .and_then(|(_, rest)| rest.split_whitespace().next())
                .and_then(|t| t.parse().ok());
            if misses.is_some() {
                log.misses = misses;
            }
        }
    }
    log
}

/// Rate in a client log name such as `memtier_etc_qps_5000_c0.log` or
/// `mutilate_master_qps_5000.log`.
pub fn rate_from_log_name(file_name: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(LOG_EXTENSION)?;
    let (_, after) = stem.split_once(RATE_MARKER)?;
    let digits = after.split('_').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sum the client logs under `root` per rate. `profile` restricts the search
/// to names containing that label, as for distribution exports. Rates where
/// no log reported throughput are absent.
pub fn collect(root: &Path, profile: Option<&str>) -> BTreeMap<u64, ThroughputSummary> {
    let paths = match walk_files(root) {
        Ok(paths) => paths,
        Err(error) => {
            warn!(%error, "cannot search for client logs");
            return BTreeMap::new();
        }
    };
    let profile = profile.filter(|p| !p.is_empty());

    let mut by_rate: BTreeMap<u64, ThroughputSummary> = BTreeMap::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if profile.is_some_and(|p| !name.contains(p)) {
            continue;
        }
        let Some(rate) = rate_from_log_name(name) else {
            continue;
        };
        let log = match fs::read_to_string(&path) {
            Ok(contents) => parse_client_log(&contents),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable client log");
                continue;
            }
        };
        let Some(ops) = log.ops_per_sec else {
            debug!(path = %path.display(), "client log reports no throughput");
            continue;
        };
        let entry = by_rate.entry(rate).or_insert(ThroughputSummary { qps: 0.0, misses: None, logs: 0 });
        entry.qps += ops;
        entry.logs += 1;
        if let Some(m) = log.misses {
            entry.misses = Some(entry.misses.unwrap_or(0.0) + m);
        }
    }
    by_rate
}

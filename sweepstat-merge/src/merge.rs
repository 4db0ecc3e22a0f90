use std::collections::BTreeMap;
use std::path::PathBuf;
use sweepstat_common::{GroupKey, SweepStatError};
use tracing::{debug, warn};

use crate::config::Quantile;
use crate::export::read_export;
use crate::powerstat::PowerSummary;
use crate::table::{CountOverflow, FrequencyTable};
use crate::throughput::ThroughputSummary;

/// One line of the quantile report.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileRow {
    pub key: GroupKey,
    /// Sum of all counts in the merged table.
    pub samples: u64,
    /// Exports that contributed counts.
    pub files: usize,
    pub mean: f64,
    /// One value per requested quantile, in request order.
    pub values: Vec<f64>,
    pub throughput: Option<ThroughputSummary>,
    pub power: Option<PowerSummary>,
}

/// An export left out of the merge, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedExport {
    pub path: PathBuf,
    pub error: SweepStatError,
}

/// Counts merged from every readable member of one group.
#[derive(Debug, Clone, Default)]
pub struct GroupMerge {
    pub table: FrequencyTable,
    pub files: usize,
    pub skipped: Vec<SkippedExport>,
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub quantiles: Vec<Quantile>,
    /// Ordered by rate, then operation label.
    pub rows: Vec<QuantileRow>,
    pub skipped: Vec<SkippedExport>,
    pub empty_groups: Vec<GroupKey>,
}

/// Value-wise sum of `tables`.
pub fn merge_tables<'a>(
    tables: impl IntoIterator<Item = &'a FrequencyTable>,
) -> Result<FrequencyTable, CountOverflow> {
    let mut merged = FrequencyTable::new();
    for table in tables {
        merged.merge(table)?;
    }
    Ok(merged)
}

/// Reconstruct every export in `paths` and sum their tables. A file that
/// cannot be read or parsed, or whose counts would overflow the group total,
/// is skipped; it never fails the group.
pub fn merge_group(paths: &[PathBuf]) -> GroupMerge {
    let mut group = GroupMerge::default();
    for path in paths {
        let merged = read_export(path).and_then(|rec| {
            group
                .table
                .merge(&rec.table)
                .map_err(|_| SweepStatError::CountOverflow(path.display().to_string()))?;
            Ok(rec)
        });
        match merged {
            Ok(rec) => {
                if rec.truncated {
                    warn!(
                        path = %path.display(),
                        rows = rec.rows,
                        "cumulative count went backwards; keeping rows before it"
                    );
                }
                debug!(path = %path.display(), samples = rec.total, buckets = rec.table.len(), "reconstructed export");
                group.files += 1;
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping export");
                group.skipped.push(SkippedExport { path: path.clone(), error });
            }
        }
    }
    group
}

/// Evaluate `quantiles` over a merged table. A table without observations is
/// [`SweepStatError::EmptyGroup`].
pub fn summarize(
    key: GroupKey,
    table: &FrequencyTable,
    files: usize,
    quantiles: &[Quantile],
) -> Result<QuantileRow, SweepStatError> {
    let empty = || SweepStatError::EmptyGroup { rate: key.rate, operation: key.operation };
    let mean = table.mean().ok_or_else(empty)?;
    let values = quantiles
        .iter()
        .map(|q| table.quantile(q.fraction()).ok_or_else(empty))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QuantileRow {
        key,
        samples: table.total(),
        files,
        mean,
        values,
        throughput: None,
        power: None,
    })
}

/// Merge each group and compute its report row. Groups that end up with no
/// observations are left out of `rows` and listed in `empty_groups`.
pub fn merge_groups(groups: &BTreeMap<GroupKey, Vec<PathBuf>>, quantiles: &[Quantile]) -> MergeReport {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    let mut empty_groups = Vec::new();

    for (&key, paths) in groups {
        let group = merge_group(paths);
        skipped.extend(group.skipped);
        match summarize(key, &group.table, group.files, quantiles) {
            Ok(row) => rows.push(row),
            Err(error) => {
                warn!(%error, files = paths.len(), "omitting group from report");
                empty_groups.push(key);
            }
        }
    }

    MergeReport { quantiles: quantiles.to_vec(), rows, skipped, empty_groups }
}

use std::path::Path;
use sweepstat_common::SweepStatError;
use thiserror::Error;

use crate::table::{CountOverflow, FrequencyTable, LatencyValue};

/// Column label that opens the HdrHistogram percentile-distribution table.
pub const HEADER_LABEL: &str = "Value";

/// Why an export could not be turned into a frequency table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportFault {
    #[error("missing Value header row")]
    MissingHeader,

    #[error("no data rows after header")]
    NoDataRows,

    #[error("cumulative count {0:?} is not a whole number in u64 range")]
    InvalidCount(String),

    #[error(transparent)]
    Overflow(#[from] CountOverflow),
}

/// The frequency table implied by one export, plus what was learned while
/// reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub table: FrequencyTable,
    /// Last accepted cumulative count; equals `table.total()`.
    pub total: u64,
    /// Data rows consumed.
    pub rows: usize,
    /// A cumulative count went backwards and the remaining rows were dropped.
    pub truncated: bool,
}

/// One parsed data row. Percentile and 1/(1-Percentile) are validated by
/// parsing but never used.
struct Row {
    value: LatencyValue,
    cumulative: u64,
}

/// Rebuild per-value counts from a percentile-distribution export by
/// differencing consecutive cumulative counts.
///
/// Reading stops at the first blank line, comment or footer line, or line
/// that is not four numeric columns; everything after the table is ignored.
/// A cumulative count lower than its predecessor is treated as a truncated
/// export: rows up to that point are kept and the rest are discarded. A
/// numeric cumulative count that is negative, fractional or beyond `u64`
/// rejects the whole export.
pub fn reconstruct(contents: &str) -> Result<Reconstruction, ExportFault> {
    let mut lines = contents.lines();
    lines
        .by_ref()
        .find(|line| line.split_whitespace().next() == Some(HEADER_LABEL))
        .ok_or(ExportFault::MissingHeader)?;

    let mut table = FrequencyTable::new();
    let mut previous: u64 = 0;
    let mut rows = 0usize;
    let mut truncated = false;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            // HdrHistogram puts a blank line between the header and the first row.
            if rows == 0 {
                continue;
            }
            break;
        }
        if trimmed.starts_with('#') {
            break;
        }
        let Some(row) = parse_row(trimmed) else {
            break;
        };
        let row = row?;
        if row.cumulative < previous {
            truncated = true;
            break;
        }
        table.add(row.value, row.cumulative - previous)?;
        previous = row.cumulative;
        rows += 1;
    }

    if rows == 0 {
        return Err(ExportFault::NoDataRows);
    }
    Ok(Reconstruction { table, total: previous, rows, truncated })
}

/// Read and reconstruct the export at `path`, attaching the path to any
/// failure.
pub fn read_export(path: &Path) -> Result<Reconstruction, SweepStatError> {
    let contents = std::fs::read_to_string(path).map_err(|e| SweepStatError::io(path, e))?;
    reconstruct(&contents).map_err(|fault| SweepStatError::MalformedExport {
        path: path.display().to_string(),
        reason: fault.to_string(),
    })
}

/// `None` when the line is not a data row at all; `Some(Err(_))` when it is
/// shaped like one but its cumulative count is unusable.
fn parse_row(line: &str) -> Option<Result<Row, ExportFault>> {
    let mut tokens = line.split_whitespace();
    let value = tokens.next()?.parse::<f64>().ok().and_then(LatencyValue::new)?;
    tokens.next()?.parse::<f64>().ok()?;
    let count_token = tokens.next()?;
    let count = count_token.parse::<f64>().ok()?;
    parse_ratio(tokens.next()?)?;
    if tokens.next().is_some() {
        return None;
    }
    Some(
        parse_count(count_token, count)
            .map(|cumulative| Row { value, cumulative })
            .ok_or_else(|| ExportFault::InvalidCount(count_token.to_string())),
    )
}

/// 2^64, the first float that no longer fits in a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Accepts `1234` as well as `1234.0` or `1.234e3`; `as_float` is the token
/// already parsed as `f64`.
fn parse_count(token: &str, as_float: f64) -> Option<u64> {
    if let Ok(n) = token.parse::<u64>() {
        return Some(n);
    }
    if as_float.is_finite() && as_float >= 0.0 && as_float.fract() == 0.0 && as_float < U64_LIMIT {
        Some(as_float as u64)
    } else {
        None
    }
}

/// The last column reaches infinity on the final row.
fn parse_ratio(token: &str) -> Option<f64> {
    if token.eq_ignore_ascii_case("infinite") {
        return Some(f64::INFINITY);
    }
    token.parse::<f64>().ok()
}

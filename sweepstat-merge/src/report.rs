use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use sweepstat_common::{Result, SweepStatError};
use tracing::info;

use crate::merge::{MergeReport, QuantileRow};

/// Where a report was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub text: PathBuf,
}

impl ReportPaths {
    pub fn new(out_dir: &Path, stem: &str) -> Self {
        Self {
            csv: out_dir.join(format!("{stem}.csv")),
            text: out_dir.join(format!("{stem}.txt")),
        }
    }
}

/// Optional column families written after `mean`, throughput first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraColumns {
    /// `qps`, `misses`
    pub throughput: bool,
    /// `power_w`, `power_stddev_w`, `cpu_busy_pct`
    pub power: bool,
}

/// Report file stem for an optional profile filter.
pub fn report_stem(base: &str, profile: Option<&str>) -> String {
    match profile.filter(|p| !p.is_empty()) {
        Some(p) => format!("{base}_{p}"),
        None => base.to_string(),
    }
}

/// Delimited rendering: `rate,operation,samples,files,<quantiles...>,mean`,
/// then whichever `extras` are enabled. A row without data for an enabled
/// family gets empty cells.
pub fn render_csv(report: &MergeReport, extras: ExtraColumns) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<String> = ["rate", "operation", "samples", "files"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(report.quantiles.iter().map(|q| q.label()));
    header.push("mean".to_string());
    if extras.throughput {
        header.extend(["qps", "misses"].iter().map(|s| s.to_string()));
    }
    if extras.power {
        header.extend(["power_w", "power_stddev_w", "cpu_busy_pct"].iter().map(|s| s.to_string()));
    }
    writer.write_record(&header).map_err(csv_error)?;

    for row in &report.rows {
        writer.write_record(csv_fields(row, extras)).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SweepStatError::Io { path: "<csv buffer>".to_string(), reason: e.to_string() })?;
    String::from_utf8(bytes)
        .map_err(|e| SweepStatError::Io { path: "<csv buffer>".to_string(), reason: e.to_string() })
}

fn csv_fields(row: &QuantileRow, extras: ExtraColumns) -> Vec<String> {
    let mut fields = vec![
        row.key.rate.to_string(),
        row.key.operation.to_string(),
        row.samples.to_string(),
        row.files.to_string(),
    ];
    fields.extend(row.values.iter().map(|v| v.to_string()));
    fields.push(format!("{:.3}", row.mean));
    if extras.throughput {
        match row.throughput {
            Some(t) => fields.extend([
                format!("{:.2}", t.qps),
                t.misses.map(|m| format!("{m:.2}")).unwrap_or_default(),
            ]),
            None => fields.extend([String::new(), String::new()]),
        }
    }
    if extras.power {
        match row.power {
            Some(p) => fields.extend([
                format!("{:.3}", p.mean_watts),
                format!("{:.3}", p.stddev_watts),
                format!("{:.2}", p.cpu_busy_pct),
            ]),
            None => fields.extend([String::new(), String::new(), String::new()]),
        }
    }
    fields
}

fn csv_error(e: csv::Error) -> SweepStatError {
    SweepStatError::Io { path: "<csv buffer>".to_string(), reason: e.to_string() }
}

/// Human-readable rendering, one block per group.
pub fn render_text(report: &MergeReport) -> String {
    let mut out = String::new();
    for (i, row) in report.rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "rate={} operation={}", row.key.rate, row.key.operation);
        let _ = writeln!(out, "  samples={}", row.samples);
        let _ = writeln!(out, "  files={}", row.files);
        let _ = writeln!(out, "  mean={:.3}", row.mean);
        for (q, v) in report.quantiles.iter().zip(&row.values) {
            let _ = writeln!(out, "  {}={}", q.label(), v);
        }
        if let Some(t) = row.throughput {
            let _ = write!(out, "  qps={:.2}", t.qps);
            if let Some(m) = t.misses {
                let _ = write!(out, " misses={m:.2}");
            }
            out.push('\n');
        }
        if let Some(p) = row.power {
            let _ = writeln!(
                out,
                "  power_w={:.3} power_stddev_w={:.3} cpu_busy_pct={:.2}",
                p.mean_watts, p.stddev_watts, p.cpu_busy_pct
            );
        }
    }
    out
}

/// Write both renderings into `out_dir`, creating it if needed. Nothing is
/// written for a report without rows; that case returns `Ok(None)`.
pub fn write_report(
    report: &MergeReport,
    out_dir: &Path,
    stem: &str,
    extras: ExtraColumns,
) -> Result<Option<ReportPaths>> {
    if report.rows.is_empty() {
        return Ok(None);
    }
    let csv = render_csv(report, extras)?;
    let text = render_text(report);

    fs::create_dir_all(out_dir).map_err(|e| SweepStatError::io(out_dir, e))?;
    let paths = ReportPaths::new(out_dir, stem);
    fs::write(&paths.csv, csv).map_err(|e| SweepStatError::io(&paths.csv, e))?;
    fs::write(&paths.text, text).map_err(|e| SweepStatError::io(&paths.text, e))?;

    info!(csv = %paths.csv.display(), text = %paths.text.display(), rows = report.rows.len(), "wrote report");
    Ok(Some(paths))
}

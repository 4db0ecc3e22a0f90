use std::path::PathBuf;
use sweepstat_common::{Result, SweepStatError};
use tracing::{info, warn};

use crate::config::MergeConfig;
use crate::grouping::ExportFilter;
use crate::merge::{merge_groups, MergeReport};
use crate::powerstat;
use crate::throughput;
use crate::report::{report_stem, write_report, ReportPaths};

/// Everything one merge invocation needs; nothing is read from the environment.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub root: PathBuf,
    /// Only exports whose name contains this label; `None` or empty matches all.
    pub profile: Option<String>,
    pub out_dir: PathBuf,
    pub config: MergeConfig,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing under the root matched the export naming convention.
    NoInputFiles,
    /// Exports were found but no group had any observations.
    NoGroups { report: MergeReport },
    Written { paths: ReportPaths, report: MergeReport },
}

/// Discover, group, merge and write. Absence of data is an outcome rather
/// than an error; only configuration problems and I/O on the search root or
/// output directory fail the run.
pub fn run(request: &MergeRequest) -> Result<RunOutcome> {
    let config = &request.config;
    config.validate()?;
    let quantiles = config.quantiles()?;
    let profile = request.profile.as_deref();

    let filter = ExportFilter::new(profile, &config.extension)?;
    let paths = match filter.discover(&request.root) {
        Ok(paths) => paths,
        Err(SweepStatError::NoInputFilesFound(root)) => {
            warn!(%root, profile = profile.unwrap_or("*"), "no distribution exports found");
            return Ok(RunOutcome::NoInputFiles);
        }
        Err(e) => return Err(e),
    };
    info!(files = paths.len(), root = %request.root.display(), "discovered exports");

    let mut groups = filter.group(paths);
    groups.retain(|key, _| config.wants(key.operation));

    let mut report = merge_groups(&groups, &quantiles);
    if config.with_throughput {
        let throughput = throughput::collect(&request.root, profile);
        for row in &mut report.rows {
            row.throughput = throughput.get(&row.key.rate).copied();
        }
    }
    if config.with_power {
        let power = powerstat::collect(&request.root);
        for row in &mut report.rows {
            row.power = power.get(&row.key.rate).copied();
        }
    }

    let stem = report_stem(&config.output_stem, profile);
    match write_report(&report, &request.out_dir, &stem, config.extra_columns())? {
        Some(paths) => Ok(RunOutcome::Written { paths, report }),
        None => {
            warn!("no group produced any samples; report not written");
            Ok(RunOutcome::NoGroups { report })
        }
    }
}

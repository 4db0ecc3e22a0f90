use clap::Parser;
use std::path::PathBuf;
use std::process;
use sweepstat_common::Operation;
use sweepstat_merge::config::MergeConfig;
use sweepstat_merge::merge::MergeReport;
use sweepstat_merge::{run, MergeRequest, RunOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sweepstat-merge",
    about = "Merge per-process percentile exports from a load sweep into global quantiles"
)]
struct Args {
    /// Directory searched recursively for distribution exports
    root: PathBuf,

    /// Only merge exports whose file name contains this workload profile label
    #[arg(long)]
    profile: Option<String>,

    /// Directory the CSV and text reports are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON file with merge settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated quantiles in percent, e.g. 50,99,99.9
    #[arg(long, value_delimiter = ',')]
    quantiles: Option<Vec<f64>>,

    /// Export file extension
    #[arg(long)]
    extension: Option<String>,

    /// Report only these operations: combined | read | write
    #[arg(long = "operation", value_parser = parse_operation)]
    operations: Vec<Operation>,

    /// Add achieved QPS and misses summed from the client .log files
    #[arg(long)]
    with_throughput: bool,

    /// Add powerstat_rate_<rate>.txt summaries to each row
    #[arg(long)]
    with_power: bool,

    /// Exit with status 2 when no report could be produced
    #[arg(long)]
    strict: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_operation(s: &str) -> Result<Operation, String> {
    Operation::from_name(s).ok_or_else(|| format!("unknown operation {s:?}; expected combined, read or write"))
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }),
        None => MergeConfig::default(),
    };
    if let Some(quantiles) = &args.quantiles {
        config.percentiles = quantiles.clone();
    }
    if let Some(extension) = &args.extension {
        config.extension = extension.clone();
    }
    if !args.operations.is_empty() {
        config.operations = args.operations.clone();
    }
    config.with_throughput |= args.with_throughput;
    config.with_power |= args.with_power;

    let request = MergeRequest {
        root: args.root.clone(),
        profile: args.profile.clone(),
        out_dir: args.out_dir.clone(),
        config,
    };

    let outcome = run(&request).unwrap_or_else(|e| {
        eprintln!("Merge failed: {e}");
        process::exit(1);
    });

    let produced = match &outcome {
        RunOutcome::Written { paths, report } => {
            print_summary(report);
            println!();
            println!("Wrote {}", paths.csv.display());
            println!("Wrote {}", paths.text.display());
            true
        }
        RunOutcome::NoGroups { report } => {
            print_summary(report);
            println!("No group produced any samples; no report written.");
            false
        }
        RunOutcome::NoInputFiles => {
            println!("No distribution exports found under {}; no report written.", args.root.display());
            false
        }
    };

    let exit_code = if !produced && args.strict { 2 } else { 0 };
    process::exit(exit_code);
}

fn print_summary(report: &MergeReport) {
    println!("Percentile Merge Results");
    println!("========================");
    println!("Groups:                {}", report.rows.len());
    println!("Samples:               {}", format_thousands(report.rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.samples))));
    println!("Skipped exports:       {}", report.skipped.len());
    println!("Empty groups:          {}", report.empty_groups.len());
    for skipped in &report.skipped {
        eprintln!("SKIPPED {} {}", skipped.path.display(), skipped.error);
    }
}

fn format_thousands(n: u64) -> String {
    if n >= 1_000_000 {
        format!("~{}M", n / 1_000_000)
    } else if n >= 1_000 {
        format!("~{}K", n / 1_000)
    } else {
        n.to_string()
    }
}

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const EXPORT: &str = "\
       Value     Percentile TotalCount 1/(1-Percentile)

       1.000 0.500000000000        100           2.00
       2.000 0.990000000000        198         100.00
       5.000 1.000000000000        200            inf
#[Mean    =        1.530, StdDeviation   =        0.561]
";

fn merge_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sweepstat-merge"))
}

#[test]
fn test_cli_writes_report() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(input.path().join("memtier_etc_qps_100_shard0_FULL_RUN_1.txt"), EXPORT).unwrap();

    let status = merge_cmd()
        .arg(input.path())
        .arg("--out-dir")
        .arg(out.path())
        .args(["--quantiles", "50,99,100"])
        .status()
        .unwrap();
    assert!(status.success());

    let csv = fs::read_to_string(out.path().join("merged_percentiles.csv")).unwrap();
    assert_eq!(csv, "rate,operation,samples,files,p50,p99,p100,mean\n100,combined,200,1,1,2,5,1.530\n");
    assert!(out.path().join("merged_percentiles.txt").exists());
}

#[test]
fn test_cli_no_input_exit_codes() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let lenient = merge_cmd().arg(input.path()).arg("--out-dir").arg(out.path()).status().unwrap();
    assert_eq!(lenient.code(), Some(0));

    let strict = merge_cmd()
        .arg(input.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("--strict")
        .status()
        .unwrap();
    assert_eq!(strict.code(), Some(2));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_cli_missing_root_fails() {
    let input = TempDir::new().unwrap();
    let status = merge_cmd().arg(input.path().join("missing")).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_cli_rejects_unknown_operation() {
    let input = TempDir::new().unwrap();
    let status = merge_cmd().arg(input.path()).args(["--operation", "scan"]).status().unwrap();
    assert!(!status.success());
}

#[test]
fn test_cli_with_throughput_adds_columns() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(input.path().join("memtier_etc_qps_100_c0_FULL_RUN_1.txt"), EXPORT).unwrap();
    fs::write(input.path().join("memtier_etc_qps_100_c0.log"), "Totals 60.5 0.00 0.00\n").unwrap();
    fs::write(input.path().join("memtier_etc_qps_100_c1.log"), "Totals 40.0 0.00 0.00\n").unwrap();

    let status = merge_cmd()
        .arg(input.path())
        .arg("--out-dir")
        .arg(out.path())
        .args(["--quantiles", "50", "--with-throughput"])
        .status()
        .unwrap();
    assert!(status.success());

    let csv = fs::read_to_string(out.path().join("merged_percentiles.csv")).unwrap();
    assert_eq!(csv, "rate,operation,samples,files,p50,mean,qps,misses\n100,combined,200,1,1,1.530,100.50,\n");
}

#[test]
fn test_cli_percentiles_flag_is_unknown() {
    let input = TempDir::new().unwrap();
    let status = merge_cmd()
        .arg(input.path())
        .args(["--percentiles", "50"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}

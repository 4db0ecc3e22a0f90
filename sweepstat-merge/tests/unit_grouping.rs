use std::fs;
use std::path::Path;
use sweepstat_common::{GroupKey, Operation, SweepStatError};
use sweepstat_merge::grouping::{infer_operation, ExportFilter};
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

#[test]
fn test_infer_operation_families() {
    assert_eq!(infer_operation("shard0_GET_command_run_1.txt"), Operation::Read);
    assert_eq!(infer_operation("client2_read.txt"), Operation::Read);
    assert_eq!(infer_operation("shard1_SET_command_run_1.txt"), Operation::Write);
    assert_eq!(infer_operation("c3_Write.txt"), Operation::Write);
    assert_eq!(infer_operation("shard0_FULL_RUN_1.txt"), Operation::Combined);
    // Read family wins when both appear.
    assert_eq!(infer_operation("get_and_set.txt"), Operation::Read);
}

#[test]
fn test_classify_reads_rate_and_suffix_operation() {
    let filter = ExportFilter::new(None, "txt").unwrap();
    assert_eq!(
        filter.classify("memtier_ycsb_qps_50000_shard3_GET_command_run_1.txt"),
        Some(GroupKey { rate: 50000, operation: Operation::Read })
    );
    assert_eq!(
        filter.classify("memtier_ycsb_qps_120_shard0_FULL_RUN_1.txt"),
        Some(GroupKey { rate: 120, operation: Operation::Combined })
    );
    assert_eq!(filter.classify("memtier_ycsb_qps_abc_shard0.txt"), None);
    assert_eq!(filter.classify("memtier_ycsb_qps_99999999999999999999999_x.txt"), None);
}

#[test]
fn test_profile_label_does_not_leak_into_operation() {
    let filter = ExportFilter::new(None, "txt").unwrap();
    assert_eq!(
        filter.classify("memtier_dataset-reads_qps_10_shard0_FULL_RUN_1.txt"),
        Some(GroupKey { rate: 10, operation: Operation::Combined })
    );
}

#[test]
fn test_matches_profile_and_extension() {
    let filter = ExportFilter::new(Some("etc"), ".txt").unwrap();
    assert!(filter.matches("mutilate_etc_qps_100_c1.txt"));
    assert!(!filter.matches("mutilate_usr_qps_100_c1.txt"));
    assert!(!filter.matches("mutilate_etc_qps_100_c1.log"));
    assert!(!filter.matches("mutilate_etc_100_c1.txt"));

    let any = ExportFilter::new(Some(""), "txt").unwrap();
    assert!(any.matches("mutilate_usr_qps_100_c1.txt"));
}

#[test]
fn test_empty_extension_is_rejected() {
    assert!(matches!(ExportFilter::new(None, "."), Err(SweepStatError::InvalidConfig(_))));
}

#[test]
fn test_discover_is_recursive_and_sorted() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "qps_200/memtier_a_qps_200_shard1_FULL_RUN_1.txt");
    touch(dir.path(), "qps_100/memtier_a_qps_100_shard0_FULL_RUN_1.txt");
    touch(dir.path(), "qps_100/memtier_a_qps_100_shard0.log");
    touch(dir.path(), "powerstat_rate_100.txt");

    let filter = ExportFilter::new(None, "txt").unwrap();
    let found = filter.discover(dir.path()).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[0].ends_with("qps_100/memtier_a_qps_100_shard0_FULL_RUN_1.txt"));
    assert!(found[1].ends_with("qps_200/memtier_a_qps_200_shard1_FULL_RUN_1.txt"));
}

#[test]
fn test_discover_nothing_is_no_input_files() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "notes.txt");
    let filter = ExportFilter::new(None, "txt").unwrap();
    assert!(matches!(filter.discover(dir.path()), Err(SweepStatError::NoInputFilesFound(_))));
}

#[test]
fn test_discover_missing_root_is_io_error() {
    let dir = TempDir::new().unwrap();
    let filter = ExportFilter::new(None, "txt").unwrap();
    assert!(matches!(
        filter.discover(&dir.path().join("missing")),
        Err(SweepStatError::Io { .. })
    ));
}

#[test]
fn test_group_buckets_by_rate_and_operation() {
    let filter = ExportFilter::new(None, "txt").unwrap();
    let paths = vec![
        "r/memtier_p_qps_200_shard0_FULL_RUN_1.txt".into(),
        "r/memtier_p_qps_100_shard1_GET_command_run_1.txt".into(),
        "r/memtier_p_qps_100_shard0_GET_command_run_1.txt".into(),
        "r/memtier_p_qps_100_shard0_SET_command_run_1.txt".into(),
        "r/memtier_p_qps_x_shard0_FULL_RUN_1.txt".into(),
    ];
    let groups = filter.group(paths);
    let keys: Vec<GroupKey> = groups.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            GroupKey { rate: 100, operation: Operation::Read },
            GroupKey { rate: 100, operation: Operation::Write },
            GroupKey { rate: 200, operation: Operation::Combined },
        ]
    );
    assert_eq!(groups[&keys[0]].len(), 2);
}

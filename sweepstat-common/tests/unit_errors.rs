use sweepstat_common::{Operation, SweepStatError};

#[test]
fn test_malformed_export_display() {
    let err = SweepStatError::MalformedExport {
        path: "logs/memtier_a_qps_100_shard0_FULL_RUN_1.txt".to_string(),
        reason: "missing Value header".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Malformed export logs/memtier_a_qps_100_shard0_FULL_RUN_1.txt: missing Value header"
    );
}

#[test]
fn test_error_equality() {
    let err1 = SweepStatError::NoInputFilesFound("runs/a".to_string());
    let err2 = SweepStatError::NoInputFilesFound("runs/a".to_string());
    let err3 = SweepStatError::NoInputFilesFound("runs/b".to_string());

    assert_eq!(err1, err2);
    assert_ne!(err1, err3);
}

#[test]
fn test_no_input_files_found() {
    let err = SweepStatError::NoInputFilesFound("runs/2025-06-16".to_string());
    assert_eq!(err.to_string(), "No input files found under runs/2025-06-16");
}

#[test]
fn test_empty_group() {
    let err = SweepStatError::EmptyGroup { rate: 50000, operation: Operation::Read };
    assert_eq!(err.to_string(), "Group rate=50000 operation=read has no samples");
}

#[test]
fn test_io_helper_formats_path_and_reason() {
    let err = SweepStatError::io("/tmp/out", "permission denied");
    assert_eq!(err.to_string(), "I/O error on /tmp/out: permission denied");
}

#[test]
fn test_invalid_config() {
    let err = SweepStatError::InvalidConfig("quantile 0 outside (0, 100]".to_string());
    assert_eq!(err.to_string(), "Invalid config: quantile 0 outside (0, 100]");
}

#[test]
fn test_count_overflow_display() {
    let err = SweepStatError::CountOverflow("runs/memtier_a_qps_100_FULL_RUN_1.txt".to_string());
    assert_eq!(
        err.to_string(),
        "Sample count overflows group total when merging runs/memtier_a_qps_100_FULL_RUN_1.txt"
    );
}

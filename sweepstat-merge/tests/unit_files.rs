use std::fs;
use sweepstat_common::SweepStatError;
use sweepstat_merge::files::walk_files;
use tempfile::TempDir;

#[test]
fn test_walk_files_is_recursive_sorted_and_files_only() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("b/nested")).unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("empty")).unwrap();
    fs::write(dir.path().join("b/nested/z.txt"), "").unwrap();
    fs::write(dir.path().join("a/y.log"), "").unwrap();
    fs::write(dir.path().join("x.txt"), "").unwrap();

    let files = walk_files(dir.path()).unwrap();
    let relative: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(relative, vec!["a/y.log", "b/nested/z.txt", "x.txt"]);
}

#[test]
fn test_walk_files_missing_root_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    match walk_files(&missing) {
        Err(SweepStatError::Io { path, .. }) => assert_eq!(path, missing.display().to_string()),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_walk_files_empty_root_is_empty() {
    let dir = TempDir::new().unwrap();
    assert!(walk_files(dir.path()).unwrap().is_empty());
}

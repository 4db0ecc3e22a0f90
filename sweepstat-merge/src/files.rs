use std::path::{Path, PathBuf};
use sweepstat_common::{Result, SweepStatError};
use tracing::warn;
use walkdir::WalkDir;

/// Every regular file under `root`, recursively, sorted by path.
///
/// An unreadable `root` is an error. Anything unreadable below it (a
/// directory without permission, a symlink loop) is logged and skipped.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) if e.depth() == 0 => return Err(SweepStatError::io(root, e)),
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                warn!(%path, error = %e, "skipping unreadable entry");
            }
        }
    }
    files.sort();
    Ok(files)
}

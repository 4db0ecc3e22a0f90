use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use sweepstat_common::{GroupKey, Operation, Result, SweepStatError, RATE_MARKER};
use tracing::{debug, warn};

use crate::files::walk_files;

/// Substrings that mark an export as covering reads, then writes. Checked in
/// this order; anything else is `combined`.
const READ_TOKENS: [&str; 2] = ["read", "get"];
const WRITE_TOKENS: [&str; 2] = ["write", "set"];

/// Decides which files are distribution exports and which group each belongs to.
///
/// Naming convention: `<tool>_<profile>_qps_<rate>_<suffix>.<ext>`.
pub struct ExportFilter {
    profile: Option<String>,
    extension: String,
    rate_pattern: Regex,
}

impl ExportFilter {
    /// An empty `profile` matches every profile. `extension` is given without
    /// the leading dot.
    pub fn new(profile: Option<&str>, extension: &str) -> Result<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(SweepStatError::InvalidConfig("export extension is empty".to_string()));
        }
        let rate_pattern = Regex::new(&format!("{}(\\d+)_", regex::escape(RATE_MARKER)))
            .map_err(|e| SweepStatError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            profile: profile.filter(|p| !p.is_empty()).map(str::to_string),
            extension: format!(".{extension}"),
            rate_pattern,
        })
    }

    /// Name-level match: profile label, rate marker and extension.
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.extension)
            && file_name.contains(RATE_MARKER)
            && self.profile.as_deref().map_or(true, |p| file_name.contains(p))
    }

    /// Group key for `file_name`, or `None` when no rate can be extracted.
    ///
    /// The operation is inferred from the part of the name after the rate, so a
    /// tool prefix or profile label cannot shadow it.
    pub fn classify(&self, file_name: &str) -> Option<GroupKey> {
        let caps = self.rate_pattern.captures(file_name)?;
        let rate = caps.get(1)?.as_str().parse::<u64>().ok()?;
        let suffix = &file_name[caps.get(0)?.end()..];
        Some(GroupKey { rate, operation: infer_operation(suffix) })
    }

    /// Recursively list every file under `root` whose name matches, sorted by
    /// path. Zero matches is [`SweepStatError::NoInputFilesFound`].
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let found: Vec<PathBuf> = walk_files(root)?
            .into_iter()
            .filter(|path| file_name_of(path).is_some_and(|n| self.matches(n)))
            .collect();
        if found.is_empty() {
            return Err(SweepStatError::NoInputFilesFound(root.display().to_string()));
        }
        Ok(found)
    }

    /// Bucket `paths` by group key. Files without an extractable rate are
    /// logged and left out.
    pub fn group(&self, paths: Vec<PathBuf>) -> BTreeMap<GroupKey, Vec<PathBuf>> {
        let mut groups: BTreeMap<GroupKey, Vec<PathBuf>> = BTreeMap::new();
        for path in paths {
            match file_name_of(&path).and_then(|n| self.classify(n)) {
                Some(key) => {
                    debug!(path = %path.display(), rate = key.rate, operation = %key.operation, "grouped export");
                    groups.entry(key).or_default().push(path);
                }
                None => warn!(path = %path.display(), "skipping export with no target rate in its name"),
            }
        }
        groups
    }
}

/// Case-insensitive substring match against the reserved label families.
pub fn infer_operation(name: &str) -> Operation {
    let lower = name.to_ascii_lowercase();
    if READ_TOKENS.iter().any(|t| lower.contains(t)) {
        Operation::Read
    } else if WRITE_TOKENS.iter().any(|t| lower.contains(t)) {
        Operation::Write
    } else {
        Operation::Combined
    }
}

fn file_name_of(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

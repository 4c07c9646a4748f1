//! Source file discovery from include/exclude glob patterns.

use glob_match::glob_match;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Expand `include` patterns under `root`, dropping `exclude` matches.
///
/// Relative patterns are resolved against `root`; exclude patterns are
/// matched against the path relative to `root`. Results keep first-seen
/// order and contain each file once.
pub fn discover_files(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in include {
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            root.join(pattern).to_string_lossy().to_string()
        };

        let entries = glob::glob(&full).map_err(|e| {
            Error::validation_invalid_argument(
                "include",
                format!("Invalid glob pattern '{}': {}", pattern, e.msg),
                Some(pattern.clone()),
                None,
            )
        })?;

        for path in entries.flatten() {
            if !path.is_file() {
                continue;
            }
            let relative = relative_path_string(root, &path);
            if matches_any(exclude, &relative) {
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Whether `path` matches any of `patterns`.
pub fn matches_any(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|pattern| glob_match(pattern, path))
}

/// `path` relative to `root` with forward slashes.
pub fn relative_path_string(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

//! Listing of companion files awaiting review.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{ExpectError, Result};

const COMPANION_SUFFIXES: [&str; 3] = [".current", ".current.png", ".diff.png"];

/// Returns true for files written next to a baseline after a mismatch.
pub fn is_companion(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| COMPANION_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}

/// Recursively collects companion files under `root`.
///
/// The returned list is sorted so reviews are stable between runs. A missing `root`
/// means nothing is pending.
pub fn pending<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ExpectError::io("walk snapshot folder", &path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() || !is_companion(entry.path()) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    files.sort();
    Ok(files)
}

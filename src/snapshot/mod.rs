//! # Snapshot Testing
//!
//! Golden-file comparison for text, binary and raster output.
//!
//! A snapshot has one *baseline* file. The first run writes it and passes silently.
//! Every later run compares against it:
//!
//! - on a match, stale companion files from earlier failures are removed;
//! - on a mismatch, a failure is reported and companion files are written next to the
//!   baseline for inspection (`<path>.current` for text and binary,
//!   `<stem>.current.png` and `<stem>.diff.png` for images).
//!
//! To accept a new output, replace the baseline with its `.current` companion, or delete
//! the baseline and rerun. [`pending`] lists every companion under a directory.
//!
//! Concurrent tests must not share a snapshot path; nothing here locks files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{ExpectError, Result};

mod pending;
mod raster;
mod store;

pub use pending::{is_companion, pending};
pub use raster::{
    compare_images, compare_or_create_image, current_image_path, diff_image_path, expect_image,
    Comparison, ImageExpectation, ImageTolerancePolicy,
};
pub use store::{compare_or_create, current_path, serialize_current};

/// What a snapshot check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No baseline existed; the current output became the baseline.
    Created,
    /// The baseline matched; stale companions were removed.
    Matched,
    /// The baseline differed; a failure was reported and companions were written.
    Mismatched,
    /// A fatal error was reported.
    Aborted,
}

// ============================================================================
// FILESYSTEM HELPERS
// ============================================================================

/// Creates the directory a snapshot lives in.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| ExpectError::io("create target folder", dir, e))
        }
        _ => Ok(()),
    }
}

/// Reads a baseline. A missing file is not an error.
pub(crate) fn read_baseline(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ExpectError::io("read snapshot", path, e)),
    }
}

pub(crate) fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| ExpectError::io("write snapshot", path, e))
}

/// Deletes a companion left over from an earlier mismatch.
pub(crate) fn remove_stale(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale companion"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale companion"),
    }
}

/// `path` with `suffix` appended to its final component.
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

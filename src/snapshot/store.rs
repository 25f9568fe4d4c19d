//! Text and binary snapshots.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{ensure_parent_dir, read_baseline, remove_stale, with_suffix, write_artifact, Outcome};
use crate::errors::Result;
use crate::format::structured_text;
use crate::reporter::Reporter;
use crate::value::Value;

/// Companion written when a text or binary snapshot does not match.
pub fn current_path(path: &Path) -> PathBuf {
    with_suffix(path, ".current")
}

/// Bytes a value is stored as: raw bytes verbatim, strings as UTF-8 and everything else
/// as its structured YAML rendering.
pub fn serialize_current(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Bytes(bytes) => Ok(bytes.clone()),
        Value::Text(text) => Ok(text.as_bytes().to_vec()),
        other => Ok(structured_text(other)?.into_bytes()),
    }
}

/// Compares `value` with the baseline at `path`, creating the baseline on first use.
///
/// Fatal setup problems are reported through [`Reporter::fatal`] and yield
/// [`Outcome::Aborted`].
pub fn compare_or_create(reporter: &dyn Reporter, path: &Path, value: &Value) -> Outcome {
    match try_compare_or_create(reporter, path, value) {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.fatal(e.to_string());
            Outcome::Aborted
        }
    }
}

fn try_compare_or_create(reporter: &dyn Reporter, path: &Path, value: &Value) -> Result<Outcome> {
    ensure_parent_dir(path)?;
    let baseline = read_baseline(path)?;
    let current = serialize_current(value)?;

    let Some(baseline) = baseline else {
        write_artifact(path, &current)?;
        debug!(path = %path.display(), bytes = current.len(), "snapshot baseline created");
        return Ok(Outcome::Created);
    };

    let companion = current_path(path);
    if baseline == current {
        remove_stale(&companion);
        return Ok(Outcome::Matched);
    }

    warn!(path = %path.display(), "snapshot mismatch");
    reporter.error(format!(
        "snapshot for {} does not match current output",
        path.display()
    ));
    write_artifact(&companion, &current)?;
    Ok(Outcome::Mismatched)
}

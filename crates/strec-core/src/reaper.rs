//! Startup cleanup: remove partial files left by an ungraceful exit.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::naming;

/// Creates `dir` if absent, then removes every entry carrying the
/// in-progress suffix. Returns the number removed. Failure to delete one
/// entry is logged and does not abort the scan; only an unusable directory
/// is an error.
pub fn clean_partial_files(dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let entries = fs::read_dir(dir)
        .with_context(|| format!("scanning output directory {}", dir.display()))?;

    let mut removed = 0usize;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !naming::is_partial_artifact(name) {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::info!(file = name, "removed leftover partial file");
                removed += 1;
            }
            Err(err) => {
                tracing::warn!(file = name, error = %err, "could not remove partial file");
            }
        }
    }

    if removed == 0 {
        tracing::debug!("no leftover partial files in {}", dir.display());
    }
    Ok(removed)
}

//! Target selection: a single file, or every video file under a directory.

use std::path::Path;

use vidmend_core::config::ScanConfig;
use vidmend_core::{Error, FileTarget, Result};
use walkdir::WalkDir;

/// Resolve the run's input into the files to diagnose.
///
/// A file is taken as-is whatever its extension. A directory is walked
/// recursively in file-name order, keeping regular files whose extension is
/// in `scan.extensions`.
pub fn collect_targets(input: &Path, scan: &ScanConfig) -> Result<Vec<FileTarget>> {
    if !input.exists() {
        return Err(Error::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    if !input.is_dir() {
        return Ok(vec![FileTarget::new(input)]);
    }

    tracing::info!("Scanning directory: {}", input.display());
    let mut targets = Vec::new();

    for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        if scan.matches_extension(&ext) {
            targets.push(FileTarget::new(entry.path()));
        }
    }

    tracing::info!("{} candidate files under {}", targets.len(), input.display());
    Ok(targets)
}

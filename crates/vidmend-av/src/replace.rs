//! Promotion of a repaired file.
//!
//! Side-by-side repairs are written straight to their final name and need no
//! promotion. In-place repairs are staged next to the original and promoted by
//! [`promote`], which keeps exactly one `<original>.bak`.
//!
//! When the repaired file takes over the original's exact name the swap is a
//! hard link (original to backup) followed by a single atomic `rename`. When
//! the name changes (e.g. `cam.h264` becoming `cam.mp4`), or the filesystem
//! refuses hard links, promotion is two renames: original to backup, then
//! staged file to final name. That sequence is **not atomic**: a crash between
//! the two leaves the backup in place and nothing at the final name. Recover
//! by renaming the `.bak` back.
//!
//! A changed name never clobbers a file that is already there: promotion fails
//! with [`Error::Replace`] before anything is moved.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use vidmend_core::{Error, Result};

/// Where a repair's output ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Write next to the original under a derived name; never touch the original.
    #[default]
    SideBySide,
    /// Stage next to the original, then replace it and keep a `.bak`.
    InPlace,
}

impl Placement {
    pub fn from_in_place(in_place: bool) -> Self {
        if in_place {
            Placement::InPlace
        } else {
            Placement::SideBySide
        }
    }
}

/// `<original file name>.bak`, e.g. `cam.h264.bak`.
pub fn backup_path(original: &Path) -> PathBuf {
    let mut name = original.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    original.with_file_name(name)
}

/// Remove a leftover backup from an earlier run. A missing backup is fine.
pub fn remove_stale_backup(backup: &Path) -> Result<()> {
    match fs::remove_file(backup) {
        Ok(()) => {
            tracing::debug!("removed stale backup {}", backup.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::BackupRemovalFailed {
            path: backup.to_path_buf(),
            source,
        }),
    }
}

/// Replace `original` with `staged`, which ends up at `final_path`.
///
/// Returns the final path.
pub fn promote(original: &Path, staged: &Path, final_path: &Path) -> Result<PathBuf> {
    if final_path != original && final_path.exists() {
        return Err(Error::replace(
            final_path,
            format!("refusing to overwrite existing file with repair of {}", original.display()),
        ));
    }

    let backup = backup_path(original);
    remove_stale_backup(&backup)?;

    if final_path == original {
        match fs::hard_link(original, &backup) {
            Ok(()) => {
                fs::rename(staged, original).map_err(|e| {
                    Error::replace(original, format!("failed to move repaired file into place: {e}"))
                })?;
                return Ok(original.to_path_buf());
            }
            Err(e) => {
                tracing::debug!("hard link unavailable ({e}), using two-step rename");
            }
        }
    }

    fs::rename(original, &backup)
        .map_err(|e| Error::replace(original, format!("failed to create backup: {e}")))?;
    // The original name is vacant until the next rename lands.
    fs::rename(staged, final_path).map_err(|e| {
        Error::replace(
            final_path,
            format!(
                "failed to move repaired file into place, original kept at {}: {e}",
                backup.display()
            ),
        )
    })?;

    Ok(final_path.to_path_buf())
}

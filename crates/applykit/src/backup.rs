//! Backup-before-overwrite.
//!
//! No mutation destroys pre-existing user content without first moving it
//! to a recoverable path. Naming is a pure function so tests can assert
//! exact paths without touching the filesystem.

use crate::error::{Error, Result};
use crate::types::BackupStyle;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// The rename-style backup path for a target: a `-backup` sibling.
#[must_use]
pub fn backup_path(original: &Path) -> PathBuf {
    let mut name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str("-backup");
    original.with_file_name(name)
}

/// The archive-style backup path for a directory: a timestamped tar.gz
/// inside the `-backup` sibling directory.
#[must_use]
pub fn archive_backup_path(dir: &Path, timestamp: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    backup_path(dir).join(format!("{}-{}.tar.gz", name, timestamp))
}

/// Moves or archives existing targets out of the way before a mutation
/// overwrites them.
pub struct BackupManager;

impl BackupManager {
    /// Preserve whatever currently exists at `target`.
    ///
    /// Returns the backup location, or `None` when the target does not
    /// exist (not an error) or a rename-style backup already holds an
    /// earlier copy. The move completes, or fails loudly, before the
    /// caller writes anything, so an interrupted run can simply be
    /// retried: once the original has moved, the backup step becomes a
    /// no-op.
    pub fn backup(target: &Path, style: BackupStyle) -> Result<Option<PathBuf>> {
        if !target.exists() {
            return Ok(None);
        }

        match style {
            BackupStyle::Rename => Self::rename(target),
            BackupStyle::Archive => {
                if target.is_dir() {
                    Self::archive(target)
                } else {
                    Self::rename(target)
                }
            }
        }
    }

    fn rename(target: &Path) -> Result<Option<PathBuf>> {
        let dest = backup_path(target);
        if dest.exists() {
            // Keep the earliest backup; the target will be overwritten
            // in place.
            log::debug!("backup already exists at {}, keeping it", dest.display());
            return Ok(None);
        }

        fs::rename(target, &dest).map_err(|e| Error::io(target, e))?;
        log::info!("backed up {} to {}", target.display(), dest.display());
        Ok(Some(dest))
    }

    fn archive(target: &Path) -> Result<Option<PathBuf>> {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let dest = archive_backup_path(target, &timestamp);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = File::create(&dest).map_err(|e| Error::io(&dest, e))?;
        let encoder = GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let arcname = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup".to_string());
        builder
            .append_dir_all(&arcname, target)
            .map_err(|e| Error::io(target, e))?;
        builder
            .into_inner()
            .and_then(GzEncoder::finish)
            .map_err(|e| Error::io(&dest, e))?;

        // Only remove the original once the archive is fully written.
        fs::remove_dir_all(target).map_err(|e| Error::io(target, e))?;

        log::info!("archived {} to {}", target.display(), dest.display());
        Ok(Some(dest))
    }
}

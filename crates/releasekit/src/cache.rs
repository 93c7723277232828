//! Per-tag extracted asset cache.
//!
//! Each resolved release tag gets its own directory under the cache root,
//! holding the fully extracted bundle. Entries are created on first use,
//! reused across runs, and never deleted automatically; a newer tag simply
//! gets a new directory next to the old one.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::Release;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tar::Archive;

/// Cache of extracted release bundles, keyed by release tag.
pub struct AssetCache {
    root: PathBuf,
}

impl AssetCache {
    /// Create a cache rooted at the given directory.
    ///
    /// The directory is created lazily on the first miss.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The canonical directory for a tag's extracted bundle.
    #[must_use]
    pub fn entry_path(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }

    /// Whether a tag already has a populated cache entry.
    #[must_use]
    pub fn is_cached(&self, tag: &str) -> bool {
        dir_is_populated(&self.entry_path(tag))
    }

    /// Ensure the cache holds the extracted bundle for `release`.
    ///
    /// On a hit this returns immediately with zero network calls. On a
    /// miss the named archive asset is downloaded to a temporary file,
    /// extracted into a temporary sibling directory, and renamed into
    /// place, so an interrupted run never leaves a half-populated entry
    /// at the canonical path.
    pub fn ensure(
        &self,
        backend: &dyn Backend,
        release: &Release,
        archive_name: &str,
    ) -> Result<PathBuf> {
        let entry = self.entry_path(&release.tag);
        if dir_is_populated(&entry) {
            log::debug!("cache hit for {} at {}", release.tag, entry.display());
            return Ok(entry);
        }

        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;

        let asset = release.asset(archive_name).ok_or_else(|| Error::Download {
            asset: archive_name.to_string(),
            message: format!("release {} has no such asset", release.tag),
        })?;

        let archive_path = self.root.join(format!("{}.partial", archive_name));
        let written = backend.download_asset(asset, &archive_path)?;
        if written == 0 {
            let _ = fs::remove_file(&archive_path);
            return Err(Error::Download {
                asset: archive_name.to_string(),
                message: "downloaded file is empty".to_string(),
            });
        }

        let staging = self.root.join(format!(".extract-{}", release.tag));
        let result = extract_archive(&archive_path, &staging);
        let _ = fs::remove_file(&archive_path);
        if let Err(e) = result {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        // An empty leftover directory still counts as a miss above; clear
        // it so the rename can land.
        if entry.exists() {
            fs::remove_dir_all(&entry).map_err(|e| Error::io(&entry, e))?;
        }
        fs::rename(&staging, &entry).map_err(|e| Error::io(&entry, e))?;

        log::info!("cached {} at {}", release.tag, entry.display());
        Ok(entry)
    }
}

/// Extract a gzip-compressed tarball into `dest`, creating it fresh.
fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    }
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    let archive_name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    archive.unpack(dest).map_err(|e| Error::Extract {
        archive: archive_name,
        message: e.to_string(),
    })
}

fn dir_is_populated(path: &Path) -> bool {
    path.is_dir()
        && fs::read_dir(path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
}

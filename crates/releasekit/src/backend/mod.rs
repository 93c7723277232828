//! Backend traits and implementations for fetching releases.
//!
//! The primary implementation is [`github::GitHubBackend`]. Use
//! [`MockBackend`] in tests to avoid network access:
//!
//! ```
//! use releasekit::backend::{Backend, MockBackend};
//! use releasekit::{Release, ReleaseAsset};
//!
//! let mut mock = MockBackend::new();
//! mock.set_latest("NyarchLinux", "NyarchLinux", Release {
//!     tag: "v3.2.0".to_string(),
//!     name: "Nyarch 3.2.0".to_string(),
//!     published_at: "2025-05-01T00:00:00Z".to_string(),
//!     assets: vec![],
//! });
//!
//! let release = mock.fetch_latest("NyarchLinux", "NyarchLinux").unwrap();
//! assert_eq!(release.tag, "v3.2.0");
//! ```

pub mod github;

use crate::error::{Error, Result};
use crate::types::{Release, ReleaseAsset};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Backend trait for fetching releases and downloading their assets.
///
/// Abstracting the release source keeps the cache logic testable without
/// a network connection.
pub trait Backend: Send + Sync {
    /// Fetch the release the remote API designates as "latest".
    ///
    /// The API's designation is trusted as-is; no version ordering is
    /// applied on top of it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoReleases`] when the repository has no published
    /// releases and [`Error::Http`] on connectivity problems.
    fn fetch_latest(&self, owner: &str, repo: &str) -> Result<Release>;

    /// Download an asset to `dest`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] if the transfer fails.
    fn download_asset(&self, asset: &ReleaseAsset, dest: &Path) -> Result<u64>;
}

/// Mock backend for testing without network access.
///
/// Stores releases and asset bytes in memory and counts downloads so
/// tests can assert cache hits never touch the network.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    latest: Arc<Mutex<HashMap<String, Release>>>,
    assets: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    downloads: Arc<Mutex<usize>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latest release for a repository.
    pub fn set_latest(&mut self, owner: &str, repo: &str, release: Release) {
        let mut latest = self.latest.lock().unwrap();
        latest.insert(format!("{}/{}", owner, repo), release);
    }

    /// Add asset bytes served for a given asset name.
    pub fn add_asset(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let mut assets = self.assets.lock().unwrap();
        assets.insert(name.into(), data);
    }

    /// Number of asset downloads performed so far.
    #[must_use]
    pub fn downloads(&self) -> usize {
        *self.downloads.lock().unwrap()
    }
}

impl Backend for MockBackend {
    fn fetch_latest(&self, owner: &str, repo: &str) -> Result<Release> {
        let latest = self.latest.lock().unwrap();
        latest
            .get(&format!("{}/{}", owner, repo))
            .cloned()
            .ok_or_else(|| Error::NoReleases {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
    }

    fn download_asset(&self, asset: &ReleaseAsset, dest: &Path) -> Result<u64> {
        *self.downloads.lock().unwrap() += 1;

        let assets = self.assets.lock().unwrap();
        let data = assets.get(&asset.name).ok_or_else(|| Error::Download {
            asset: asset.name.clone(),
            message: "mock asset not configured".to_string(),
        })?;

        fs::write(dest, data).map_err(|e| Error::io(dest, e))?;
        Ok(data.len() as u64)
    }
}

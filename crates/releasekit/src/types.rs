//! Core types for release resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A published release of the asset repository.
///
/// Immutable once resolved; the tag names one snapshot of the upstream
/// assets and doubles as the cache directory name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v3.2.0").
    pub tag: String,
    /// Release name as published.
    pub name: String,
    /// Published date (ISO 8601 format).
    pub published_at: String,
    /// Downloadable assets attached to the release.
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Find an asset by exact name.
    #[must_use]
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset name (e.g., "NyarchLinux.tar.gz").
    pub name: String,
    /// Download URL.
    pub download_url: String,
    /// Size in bytes as reported by the API.
    pub size: u64,
}

impl ReleaseAsset {
    /// Check if this asset is a gzip-compressed tarball.
    #[must_use]
    pub fn is_targz(&self) -> bool {
        self.name.ends_with(".tar.gz") || self.name.ends_with(".tgz")
    }

    /// Get a human-readable size string.
    #[must_use]
    pub fn human_size(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if self.size >= GB {
            format!("{:.1} GB", self.size as f64 / GB as f64)
        } else if self.size >= MB {
            format!("{:.1} MB", self.size as f64 / MB as f64)
        } else if self.size >= KB {
            format!("{:.1} KB", self.size as f64 / KB as f64)
        } else {
            format!("{} B", self.size)
        }
    }
}

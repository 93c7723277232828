//! GitHub releases backend.
//!
//! Queries GitHub's Releases API for the release marked "latest" and
//! downloads its assets.
//!
//! # Rate Limiting
//!
//! The GitHub API has rate limits. For unauthenticated requests, the limit
//! is 60 requests per hour, which is plenty for one resolution per run.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{Release, ReleaseAsset};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Maximum download size (2 GB covers the full asset bundle with room to spare).
const MAX_BODY_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// GitHub releases backend.
///
/// # Example
///
/// ```no_run
/// use releasekit::backend::github::GitHubBackend;
/// use releasekit::backend::Backend;
///
/// let backend = GitHubBackend::new();
/// let release = backend.fetch_latest("NyarchLinux", "NyarchLinux").unwrap();
/// println!("latest tag: {}", release.tag);
/// ```
pub struct GitHubBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// GitHub API base URL.
    api_base: String,
}

impl GitHubBackend {
    /// Create a new GitHub backend.
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::Agent::new_with_defaults();
        Self {
            agent,
            api_base: "https://api.github.com".to_string(),
        }
    }

    /// Create a backend with a custom API base (for testing).
    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let agent = ureq::Agent::new_with_defaults();
        Self {
            agent,
            api_base: api_base.into(),
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build the API URL for the latest release.
    fn latest_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases/latest", self.api_base, owner, repo)
    }
}

impl Default for GitHubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for GitHubBackend {
    fn fetch_latest(&self, owner: &str, repo: &str) -> Result<Release> {
        let url = self.latest_url(owner, repo);

        let response: GitHubRelease = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "nyarchup")
            .call()
            .map_err(|e| match e {
                // 404 on /releases/latest means the repo has no releases.
                ureq::Error::StatusCode(404) => Error::NoReleases {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                },
                other => other.into(),
            })?
            .body_mut()
            .read_json()?;

        if response.tag_name.is_empty() {
            return Err(Error::InvalidResponse(
                "tag_name missing from release payload".to_string(),
            ));
        }

        Ok(response.into())
    }

    fn download_asset(&self, asset: &ReleaseAsset, dest: &Path) -> Result<u64> {
        log::info!("downloading {} from {}", asset.name, asset.download_url);

        let mut response = self
            .agent
            .get(&asset.download_url)
            .header("Accept", "application/octet-stream")
            .header("User-Agent", "nyarchup")
            .call()
            .map_err(|e| Error::Download {
                asset: asset.name.clone(),
                message: e.to_string(),
            })?;

        let mut file = File::create(dest).map_err(|e| Error::io(dest, e))?;

        let mut reader = response.body_mut().with_config().limit(MAX_BODY_SIZE).reader();
        let written = std::io::copy(&mut reader, &mut file).map_err(|e| Error::Download {
            asset: asset.name.clone(),
            message: e.to_string(),
        })?;

        Ok(written)
    }
}

// =============================================================================
// GitHub API response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    name: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
    size: u64,
}

impl From<GitHubRelease> for Release {
    fn from(r: GitHubRelease) -> Self {
        Self {
            tag: r.tag_name.clone(),
            name: r.name.unwrap_or(r.tag_name),
            published_at: r.published_at.unwrap_or_default(),
            assets: r.assets.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<GitHubAsset> for ReleaseAsset {
    fn from(a: GitHubAsset) -> Self {
        Self {
            name: a.name,
            download_url: a.browser_download_url,
            size: a.size,
        }
    }
}

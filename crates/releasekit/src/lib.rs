//! # releasekit
//!
//! Resolve the latest GitHub release of an asset repository and keep a
//! local, per-tag cache of its extracted bundle.
//!
//! This crate covers the acquisition half of the install pipeline:
//! - Querying the release API for the tag marked "latest"
//! - Downloading the bundle archive once per tag
//! - Extracting it atomically into `cache_root/<tag>`
//!
//! ## Example
//!
//! ```no_run
//! use releasekit::{AssetCache, Resolver};
//!
//! let resolver = Resolver::new();
//! let release = resolver.latest("NyarchLinux", "NyarchLinux").unwrap();
//!
//! let cache = AssetCache::new("/home/user/.cache/nyarchup");
//! let bundle = cache
//!     .ensure(resolver.backend(), &release, "NyarchLinux.tar.gz")
//!     .unwrap();
//! println!("assets extracted at {}", bundle.display());
//! ```
//!
//! Errors are never retried automatically; a failed resolution or download
//! is surfaced to the caller, and rerunning the tool is cheap because cache
//! hits skip the network entirely.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod types;

pub use cache::AssetCache;
pub use error::{Error, Result};
pub use types::{Release, ReleaseAsset};

use backend::Backend;
pub use backend::MockBackend;
use backend::github::GitHubBackend;

/// Resolves releases through a pluggable [`Backend`].
///
/// The default backend talks to the GitHub API; tests swap in a
/// [`MockBackend`].
pub struct Resolver {
    backend: Box<dyn Backend>,
}

impl Resolver {
    /// Create a resolver with the default GitHub backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: Box::new(GitHubBackend::new()),
        }
    }

    /// Create a resolver with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The release the remote API designates as latest.
    pub fn latest(&self, owner: &str, repo: &str) -> Result<Release> {
        self.backend.fetch_latest(owner, repo)
    }

    /// Borrow the underlying backend, e.g. to hand to [`AssetCache::ensure`].
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_with_mock_backend() {
        let mut mock = MockBackend::new();
        mock.set_latest(
            "NyarchLinux",
            "NyarchLinux",
            Release {
                tag: "v3.2.0".to_string(),
                name: "Nyarch 3.2.0".to_string(),
                published_at: String::new(),
                assets: vec![],
            },
        );
        let resolver = Resolver::with_backend(Box::new(mock));

        let release = resolver.latest("NyarchLinux", "NyarchLinux").unwrap();
        assert_eq!(release.tag, "v3.2.0");
    }

    #[test]
    fn test_resolver_no_releases() {
        let resolver = Resolver::with_backend(Box::new(MockBackend::new()));
        let result = resolver.latest("NyarchLinux", "empty");
        assert!(matches!(result, Err(Error::NoReleases { .. })));
    }
}

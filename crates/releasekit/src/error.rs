//! Error types for release resolution and asset caching.

use std::io;
use std::path::PathBuf;

/// Result type alias for releasekit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving releases or populating the cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connectivity, timeout, unexpected status).
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The repository has no published releases.
    #[error("no releases found for {owner}/{repo}")]
    NoReleases {
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
    },

    /// Failed to download an asset.
    #[error("download failed for {asset}: {message}")]
    Download {
        /// Asset name.
        asset: String,
        /// Error message.
        message: String,
    },

    /// Failed to extract the downloaded archive.
    #[error("extraction failed for {archive}: {message}")]
    Extract {
        /// Archive file name.
        archive: String,
        /// Error message.
        message: String,
    },

    /// Invalid response from the release API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// IO error during cache operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Whether this error came back as an HTTP 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoReleases { .. } | Self::Http { status: Some(404), .. }
        )
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let no_releases = Error::NoReleases {
            owner: "NyarchLinux".to_string(),
            repo: "NyarchLinux".to_string(),
        };
        assert!(no_releases.is_not_found());

        let missing = Error::http("HTTP 404", Some(404));
        assert!(missing.is_not_found());

        let timeout = Error::http("timed out", None);
        assert!(!timeout.is_not_found());
    }

    #[test]
    fn test_http_constructor() {
        let err = Error::http("connection reset", Some(502));
        match err {
            Error::Http { message, status } => {
                assert_eq!(message, "connection reset");
                assert_eq!(status, Some(502));
            }
            _ => panic!("Expected Error::Http"),
        }
    }

    #[test]
    fn test_io_constructor_keeps_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = Error::io("/var/cache/nyarchup", io_err);
        match err {
            Error::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/var/cache/nyarchup"));
            }
            _ => panic!("Expected Error::Io"),
        }
    }

    #[test]
    fn test_display_includes_detail() {
        let err = Error::Extract {
            archive: "NyarchLinux.tar.gz".to_string(),
            message: "unexpected EOF".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("NyarchLinux.tar.gz"));
        assert!(display.contains("unexpected EOF"));
    }
}

//! Error types for mutation application.

use std::io;
use std::path::PathBuf;

/// Result type alias for applykit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while applying a single mutation.
///
/// These are caught at the mutation boundary by the pipeline and folded
/// into the run report; they never terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The catalog referenced a path absent from the extracted bundle.
    #[error("asset missing from bundle: {path}")]
    MissingAsset {
        /// Bundle-relative path that was expected.
        path: PathBuf,
    },

    /// Filesystem failure during copy, write, or backup.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An external tool invocation failed.
    ///
    /// Only the exit status is inspected; tool output goes straight to
    /// the user's terminal.
    #[error("{program} failed: {detail}")]
    ExternalTool {
        /// Program that was invoked.
        program: String,
        /// What went wrong (spawn failure or exit status).
        detail: String,
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

    /// Create an external-tool error.
    pub fn tool(program: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExternalTool {
            program: program.into(),
            detail: detail.into(),
        }
    }
}

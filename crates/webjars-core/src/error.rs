//! Error types for asset loading, resolution and streaming.

use std::io;
use std::path::PathBuf;

use http::StatusCode;
use thiserror::Error;

/// Errors raised while loading sources or resolving logical paths.
#[derive(Debug, Error)]
pub enum AssetError {
    /// No bundled asset corresponds to the logical path.
    #[error("asset not found: {path}")]
    NotFound {
        /// The logical path that was looked up.
        path: String,
    },

    /// An unscoped lookup matched assets in more than one library.
    #[error("ambiguous asset {path}: candidates {candidates:?}")]
    Ambiguous {
        /// The logical path that was looked up.
        path: String,
        /// Fully-qualified paths of the competing candidates.
        candidates: Vec<String>,
    },

    /// A search-path entry could not be read.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        /// The search-path entry.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A search-path entry is not a recognised archive or directory.
    #[error("unsupported search path entry {}: {reason}", path.display())]
    Unsupported {
        /// The search-path entry.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },
}

impl AssetError {
    /// Create a new not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a new load error.
    pub fn load(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Load {
            path: path.into(),
            source,
        }
    }

    /// Create a new unsupported-entry error.
    pub fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::Ambiguous { .. } => StatusCode::NOT_FOUND,
            Self::Load { .. } | Self::Unsupported { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors raised while streaming an archive entry.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The entry could not be opened (vanished, unreadable).
    #[error("failed to open {path}: {source}")]
    Open {
        /// Archive-internal path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading, compressing or writing failed after the entry was opened.
    #[error("failed to transfer {path}: {source}")]
    Transfer {
        /// Archive-internal path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StreamError {
    /// Create a new open error.
    pub fn open(path: impl Into<String>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a new transfer error.
    pub fn transfer(path: impl Into<String>, source: io::Error) -> Self {
        Self::Transfer {
            path: path.into(),
            source,
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// A failed open is indistinguishable from a missing asset.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Open { .. } => StatusCode::NOT_FOUND,
            Self::Transfer { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

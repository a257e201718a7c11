//! Error types for the download module.
//!
//! This module defines structured errors for binary asset retrieval,
//! providing context-rich error messages for the harvest log.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching and storing a binary asset.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while reading or writing the destination.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest declared a filename that cannot be stored inside the issue directory.
    #[error("refusing to store {url} as unsafe filename {filename:?}")]
    UnsafeFilename {
        /// The asset URL.
        url: String,
        /// The declared filename.
        filename: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Description of the builder failure.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an unsafe filename error.
    pub fn unsafe_filename(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::UnsafeFilename {
            url: url.into(),
            filename: filename.into(),
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Returns true when the remote side (status, transport) caused the failure.
    #[must_use]
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path that the source error does not carry.

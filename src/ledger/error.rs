//! Error types for ledger files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while appending to or reading a ledger file.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Filesystem failure on the ledger file.
    #[error("ledger I/O error at {path}: {source}")]
    Io {
        /// The ledger file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The ledger file does not exist yet.
    #[error("ledger file not found: {path}")]
    Missing {
        /// The ledger file that was expected.
        path: PathBuf,
    },
}

impl LedgerError {
    /// Creates an I/O error, mapping `NotFound` to [`LedgerError::Missing`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::Missing { path };
        }
        Self::Io { path, source }
    }

    /// Returns the ledger file involved.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Missing { path } => path,
        }
    }

    /// Returns true when the ledger simply has not been written yet.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

//! Fatal harvest errors.
//!
//! Everything scoped to one issue or one asset is handled inside the
//! harvester and never surfaces here.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;
use crate::ledger::LedgerError;
use crate::sru::SruError;

/// Errors that stop a harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The configuration was rejected before any I/O.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration is invalid.
        reason: String,
    },

    /// The root data directory could not be created.
    #[error("cannot create data directory {path}: {source}")]
    Filesystem {
        /// The root directory.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Discovery failed; the search cannot continue.
    #[error("search failed: {0}")]
    Search(#[from] SruError),

    /// A ledger file could not be read or written.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Materialization was asked to read a URL ledger that does not exist.
    #[error("no URL ledger for PPN {ppn} at {path}; harvest the URLs first")]
    MissingUrlLedger {
        /// The PPN being harvested.
        ppn: String,
        /// The expected ledger path.
        path: PathBuf,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] DownloadError),
}

impl HarvestError {
    /// Creates a configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised before any I/O.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::InvalidConfig { .. } => true,
            Self::Search(error) => error.is_configuration(),
            _ => false,
        }
    }
}

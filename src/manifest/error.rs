//! Error types for manifest retrieval and parsing.

use thiserror::Error;

/// Ledger code recorded for transport failures that carry no HTTP status.
pub const NETWORK_FAILURE_CODE: &str = "network";

/// Errors raised while fetching or interpreting an issue manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Transport failure (DNS, connect, TLS, timeout, body read).
    #[error("network error fetching manifest {url}: {source}")]
    Network {
        /// The manifest URL as queued.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The manifest endpoint answered with a non-success status.
    #[error("HTTP {status} fetching manifest {url}")]
    HttpStatus {
        /// The manifest URL as queued.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response carries an embedded OAI-PMH error instead of a record.
    #[error("protocol error {code} for manifest {url}")]
    Protocol {
        /// The manifest URL as queued.
        url: String,
        /// The embedded error code (e.g. `idDoesNotExist`).
        code: String,
    },

    /// The response is not well-formed XML.
    #[error("malformed manifest: {reason}")]
    Malformed {
        /// Parser message.
        reason: String,
    },

    /// A structural part required to store the issue is missing.
    #[error("incomplete manifest: {missing}")]
    Incomplete {
        /// Which part is missing.
        missing: String,
    },
}

impl ManifestError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
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

    /// Creates a protocol error.
    pub fn protocol(url: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Protocol {
            url: url.into(),
            code: code.into(),
        }
    }

    /// Creates an incomplete-manifest error.
    pub fn incomplete(missing: impl Into<String>) -> Self {
        Self::Incomplete {
            missing: missing.into(),
        }
    }

    /// Returns true for failures of the retrieval itself.
    #[must_use]
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }

    /// Returns true when the document lacks data needed to store the issue.
    #[must_use]
    pub fn is_completeness(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::Incomplete { .. })
    }

    /// Returns the code to append to the error ledger, if this failure is ledgered.
    ///
    /// Completeness failures are only logged: retrying them yields the same document.
    #[must_use]
    pub fn ledger_code(&self) -> Option<String> {
        match self {
            Self::Protocol { code, .. } => Some(code.clone()),
            Self::HttpStatus { status, .. } => Some(format!("http-{status}")),
            Self::Network { .. } => Some(NETWORK_FAILURE_CODE.to_string()),
            Self::Malformed { .. } | Self::Incomplete { .. } => None,
        }
    }
}

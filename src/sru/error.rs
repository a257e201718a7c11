//! Error types for SRU searches.

use thiserror::Error;

/// Errors raised while building or paging through an SRU search.
#[derive(Debug, Error)]
pub enum SruError {
    /// The query names a collection that has not been registered.
    #[error("configuration error: unknown collection '{name}'")]
    UnknownCollection {
        /// The requested collection name.
        name: String,
    },

    /// The query itself is unusable (e.g. a zero page size).
    #[error("configuration error: {reason}")]
    InvalidQuery {
        /// What is wrong with the query.
        reason: String,
    },

    /// Transport failure talking to the SRU endpoint.
    #[error("network error querying {url}: {source}")]
    Network {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The SRU endpoint answered with a non-success status.
    #[error("HTTP {status} querying {url}")]
    HttpStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response has no `numberOfRecords` element.
    #[error("protocol error: response from {url} lacks numberOfRecords")]
    MissingRecordCount {
        /// The request URL.
        url: String,
    },

    /// The `numberOfRecords` element is not a non-negative integer.
    #[error("protocol error: invalid numberOfRecords '{value}' from {url}")]
    InvalidRecordCount {
        /// The request URL.
        url: String,
        /// The raw element text.
        value: String,
    },

    /// The response body is not well-formed XML.
    #[error("protocol error: malformed response from {url}: {reason}")]
    MalformedResponse {
        /// The request URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}

impl SruError {
    /// Creates an unknown collection error.
    pub fn unknown_collection(name: impl Into<String>) -> Self {
        Self::UnknownCollection { name: name.into() }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

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

    /// Returns true for errors detected before any request is made.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownCollection { .. } | Self::InvalidQuery { .. }
        )
    }
}

//! Retrieval of issue manifests over OAI-PMH.

use std::fmt;

use reqwest::Client;
use tracing::{debug, instrument};

use super::ManifestError;
use super::document::Manifest;

/// Path marker after which the archive expects the API key segment.
pub const OAI_PATH_MARKER: &str = "/mdo/oai";

/// Embeds `api_key` as the path segment right after [`OAI_PATH_MARKER`].
///
/// `http://services.kb.nl/mdo/oai?verb=GetRecord&…` becomes
/// `http://services.kb.nl/mdo/oai/<key>?verb=GetRecord&…`. URLs without the
/// marker are returned unchanged.
#[must_use]
pub fn with_api_key(url: &str, api_key: &str) -> String {
    let Some(marker_at) = find_marker(url) else {
        debug!(url, "no OAI path marker; leaving URL unchanged");
        return url.to_string();
    };
    let split_at = marker_at + OAI_PATH_MARKER.len();
    format!("{}/{api_key}{}", &url[..split_at], &url[split_at..])
}

/// Finds the marker where it ends a path segment (followed by `?`, `/`, `#` or the end).
fn find_marker(url: &str) -> Option<usize> {
    url.match_indices(OAI_PATH_MARKER)
        .map(|(index, _)| index)
        .find(|index| {
            url[index + OAI_PATH_MARKER.len()..]
                .chars()
                .next()
                .is_none_or(|c| matches!(c, '?' | '/' | '#'))
        })
}

/// A manifest response body, parsed on demand.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    url: String,
    raw: String,
}

impl FetchedManifest {
    /// Wraps a response body fetched for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw: raw.into(),
        }
    }

    /// The URL as queued (without any API key).
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw response body.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parses the body without interpreting protocol errors.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Malformed`] when the body is not XML.
    pub fn parse(&self) -> Result<Manifest<'_>, ManifestError> {
        Manifest::parse(&self.raw)
    }

    /// Parses the body and turns an embedded OAI-PMH error into [`ManifestError::Protocol`].
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Malformed`] or [`ManifestError::Protocol`].
    pub fn open(&self) -> Result<Manifest<'_>, ManifestError> {
        let manifest = self.parse()?;
        if let Some(code) = manifest.error_code() {
            return Err(ManifestError::protocol(&self.url, code));
        }
        Ok(manifest)
    }
}

/// Fetches manifests, optionally authenticating with an API key.
#[derive(Clone)]
pub struct ManifestFetcher {
    client: Client,
    api_key: Option<String>,
}

impl fmt::Debug for ManifestFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestFetcher")
            .field("client", &self.client)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ManifestFetcher {
    /// Creates a fetcher.
    #[must_use]
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    /// Returns the URL actually requested for a queued manifest URL.
    #[must_use]
    pub fn request_url(&self, url: &str) -> String {
        match self.api_key.as_deref() {
            Some(key) => with_api_key(url, key),
            None => url.to_string(),
        }
    }

    /// Performs one GET for `url`. Not retried.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Network`] or [`ManifestError::HttpStatus`]
    /// when retrieval fails. Errors carry `url` as queued, never the keyed URL.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedManifest, ManifestError> {
        let request_url = self.request_url(url);
        // reqwest errors carry the request URL, which may hold the key.
        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(|e| ManifestError::network(url, e.without_url()))?;

        if !response.status().is_success() {
            return Err(ManifestError::http_status(url, response.status().as_u16()));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ManifestError::network(url, e.without_url()))?;
        debug!(bytes = raw.len(), "manifest fetched");
        Ok(FetchedManifest::new(url, raw))
    }
}

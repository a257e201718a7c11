//! Harvest configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::download::DEFAULT_BINARY_DELAY;
use crate::sru::{
    CollectionRegistry, DDD, DEFAULT_PAGE_DELAY, DEFAULT_PAGE_SIZE, DEFAULT_SRU_ENDPOINT,
    MAX_PAGE_SIZE,
};

use super::HarvestError;

/// Default pause after every issue attempt.
pub const DEFAULT_ISSUE_DELAY: Duration = Duration::from_secs(2);

/// Fixed pauses between remote requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    /// After each search page, before the next one.
    pub page_delay: Duration,
    /// After each issue attempt.
    pub issue_delay: Duration,
    /// After each network fetch of a binary.
    pub binary_delay: Duration,
}

impl Default for Politeness {
    fn default() -> Self {
        Self {
            page_delay: DEFAULT_PAGE_DELAY,
            issue_delay: DEFAULT_ISSUE_DELAY,
            binary_delay: DEFAULT_BINARY_DELAY,
        }
    }
}

impl Politeness {
    /// No pauses at all. Meant for tests against local mock servers.
    #[must_use]
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            issue_delay: Duration::ZERO,
            binary_delay: Duration::ZERO,
        }
    }
}

/// Which ledger feeds the materialization phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkSource {
    /// `issues-<ppn>.txt` written by discovery.
    #[default]
    DiscoveredUrls,
    /// `errors.tsv`, for a retry pass.
    ErrorLedger,
}

/// Everything a [`Harvester`](super::Harvester) needs to run.
#[derive(Clone)]
pub struct HarvestConfig {
    /// Root data directory.
    pub root: PathBuf,
    /// Access key embedded into manifest URLs.
    pub api_key: Option<String>,
    /// Request pacing.
    pub politeness: Politeness,
    /// SRU endpoint URL.
    pub sru_endpoint: String,
    /// Records requested per search page.
    pub page_size: u32,
    /// Registered collection name to search.
    pub collection: String,
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("root", &self.root)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("politeness", &self.politeness)
            .field("sru_endpoint", &self.sru_endpoint)
            .field("page_size", &self.page_size)
            .field("collection", &self.collection)
            .finish()
    }
}

impl HarvestConfig {
    /// Creates a configuration with default endpoint, pacing and page size.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            api_key: None,
            politeness: Politeness::default(),
            sru_endpoint: DEFAULT_SRU_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            collection: DDD.name.to_string(),
        }
    }

    /// Sets the API key. Blank keys are treated as absent.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        self
    }

    /// Sets the request pacing.
    #[must_use]
    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.politeness = politeness;
        self
    }

    /// Sets the SRU endpoint.
    #[must_use]
    pub fn with_sru_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sru_endpoint = endpoint.into();
        self
    }

    /// Sets the search page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the collection to search.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Checks the configuration without touching the filesystem or network.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidConfig`] for an empty root, a page size
    /// outside `1..=MAX_PAGE_SIZE`, or a collection missing from `registry`.
    pub fn validate(&self, registry: &CollectionRegistry) -> Result<(), HarvestError> {
        if self.root.as_os_str().is_empty() {
            return Err(HarvestError::invalid_config("root directory must not be empty"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(HarvestError::invalid_config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        registry
            .resolve(&self.collection)
            .map_err(|e| HarvestError::invalid_config(e.to_string()))?;
        Ok(())
    }
}

//! Cursor-based pagination over SRU search results.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::collection::{Collection, CollectionRegistry};
use super::response::{SearchPage, parse_search_response};
use super::SruError;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size the SRU endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Default pause between successive page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(5);

/// Default SRU endpoint of the archive.
pub const DEFAULT_SRU_ENDPOINT: &str = "http://jsru.kb.nl/sru/sru";

/// Result ordering requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest publication date first.
    #[default]
    DateAscending,
    /// Newest publication date first.
    DateDescending,
}

impl SortOrder {
    /// Returns the CQL `sortBy` clause target.
    #[must_use]
    pub fn as_cql(self) -> &'static str {
        match self {
            Self::DateAscending => "dc.date/sort.ascending",
            Self::DateDescending => "dc.date/sort.descending",
        }
    }
}

/// A search for all records of one newspaper title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// PPN of the newspaper title.
    pub ppn: String,
    /// Short name of a registered collection.
    pub collection: String,
    /// Server-side ordering.
    pub sort: SortOrder,
    /// Records per page.
    pub page_size: u32,
    /// 1-based offset of the first requested record.
    pub start: u64,
}

impl SearchQuery {
    /// Creates the default query for a PPN: `DDD`, date ascending, 100 per page from record 1.
    #[must_use]
    pub fn for_ppn(ppn: impl Into<String>) -> Self {
        Self {
            ppn: ppn.into(),
            collection: "DDD".to_string(),
            sort: SortOrder::default(),
            page_size: DEFAULT_PAGE_SIZE,
            start: 1,
        }
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the collection short name.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sets the first requested record.
    #[must_use]
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Returns the CQL query string sent to the server.
    #[must_use]
    pub fn cql(&self) -> String {
        format!("ppn exact {} sortBy {}", self.ppn, self.sort.as_cql())
    }

    fn validate(&self) -> Result<(), SruError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(SruError::invalid_query(format!(
                "page size {} outside 1..={MAX_PAGE_SIZE}",
                self.page_size
            )));
        }
        if self.start == 0 {
            return Err(SruError::invalid_query("start record is 1-based"));
        }
        if self.ppn.trim().is_empty() {
            return Err(SruError::invalid_query("empty PPN"));
        }
        Ok(())
    }
}

/// Client for the SRU search endpoint.
#[derive(Debug, Clone)]
pub struct SruClient {
    client: Client,
    endpoint: Url,
    registry: CollectionRegistry,
    page_delay: Duration,
}

impl SruClient {
    /// Creates a client for `endpoint` with the default collection registry.
    ///
    /// # Errors
    ///
    /// Returns [`SruError::InvalidQuery`] when `endpoint` is not a URL.
    pub fn new(client: Client, endpoint: &str, page_delay: Duration) -> Result<Self, SruError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SruError::invalid_query(format!("invalid SRU endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            client,
            endpoint,
            registry: CollectionRegistry::default(),
            page_delay,
        })
    }

    /// Replaces the collection registry.
    #[must_use]
    pub fn with_registry(mut self, registry: CollectionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the collection registry.
    #[must_use]
    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Starts a search. No request is made until [`SearchCursor::next_page`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown collections or invalid paging.
    pub fn search(&self, query: SearchQuery) -> Result<SearchCursor, SruError> {
        let collection = self.registry.resolve(&query.collection)?.clone();
        query.validate()?;
        debug!(query = %query.cql(), collection = collection.collection_id, "search prepared");
        Ok(SearchCursor {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            collection,
            next_start: query.start,
            query,
            total: None,
            page_delay: self.page_delay,
            requests_made: 0,
            exhausted: false,
        })
    }
}

/// Explicit pagination state for one search.
///
/// Pages come out in increasing start-offset order. The cursor cannot be
/// rewound; it is done once the next offset passes the total, the total is
/// zero, or a request failed.
#[derive(Debug)]
pub struct SearchCursor {
    client: Client,
    endpoint: Url,
    collection: Collection,
    query: SearchQuery,
    next_start: u64,
    total: Option<u64>,
    page_delay: Duration,
    requests_made: usize,
    exhausted: bool,
}

impl SearchCursor {
    /// Fetches the next page, or `None` when the result set is exhausted.
    ///
    /// The first request also establishes the total record count; a total of
    /// zero ends the search without yielding a page.
    ///
    /// # Errors
    ///
    /// Any retrieval or protocol error ends the whole search; later calls
    /// return `Ok(None)`.
    #[instrument(skip(self), fields(ppn = %self.query.ppn, start = self.next_start))]
    pub async fn next_page(&mut self) -> Result<Option<SearchPage>, SruError> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(total) = self.total
            && self.next_start > total
        {
            self.exhausted = true;
            return Ok(None);
        }

        if self.requests_made > 0 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        let start = self.next_start;
        let mut page = match self.fetch(start).await {
            Ok(page) => page,
            Err(error) => {
                self.exhausted = true;
                return Err(error);
            }
        };
        self.requests_made += 1;

        match self.total {
            None => {
                info!(total = page.total, "search result size");
                self.total = Some(page.total);
                if page.total == 0 {
                    self.exhausted = true;
                    return Ok(None);
                }
            }
            Some(total) if total != page.total => {
                warn!(
                    expected = total,
                    reported = page.total,
                    "server changed the record count mid-search; keeping the first"
                );
                page.total = total;
            }
            Some(_) => {}
        }

        self.next_start = start.saturating_add(u64::from(self.query.page_size));
        debug!(
            records = page.records.len(),
            max_position = ?page.max_position(),
            "page fetched"
        );
        Ok(Some(page))
    }

    /// Returns the total record count once the first page has been fetched.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Returns the number of page requests made so far.
    #[must_use]
    pub fn requests_made(&self) -> usize {
        self.requests_made
    }

    /// Returns the query being paged.
    #[must_use]
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    fn page_url(&self, start: u64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("version", "1.2")
            .append_pair("operation", "searchRetrieve")
            .append_pair("x-collection", self.collection.collection_id)
            .append_pair("recordSchema", self.collection.record_schema)
            .append_pair("startRecord", &start.to_string())
            .append_pair("maximumRecords", &self.query.page_size.to_string())
            .append_pair("query", &self.query.cql());
        url
    }

    async fn fetch(&self, start: u64) -> Result<SearchPage, SruError> {
        let url = self.page_url(start);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SruError::network(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(SruError::http_status(
                url.as_str(),
                response.status().as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SruError::network(url.as_str(), e))?;
        parse_search_response(&body, url.as_str(), start)
    }
}

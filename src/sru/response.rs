//! Parsing of SRU `searchRetrieveResponse` documents.

use roxmltree::Document;
use tracing::warn;

use super::SruError;
use crate::xml::{NS_DDDX, NS_SRW, child, descendant, text_of};

/// One record of a result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    /// Server-declared 1-based position in the full result set.
    pub position: Option<u64>,
    /// Manifest URL taken from the record's `metadataKey`.
    pub url: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Total number of records matching the query.
    pub total: u64,
    /// Start offset this page was requested with.
    pub start: u64,
    /// Records in server order.
    pub records: Vec<SearchRecord>,
}

impl SearchPage {
    /// Returns the record URLs in server order, skipping records without one.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|r| r.url.as_deref())
    }

    /// Returns the highest record position on this page.
    #[must_use]
    pub fn max_position(&self) -> Option<u64> {
        self.records.iter().filter_map(|r| r.position).max()
    }
}

/// Parses a search response body fetched from `url` with `startRecord = start`.
///
/// # Errors
///
/// Returns a protocol error when the body is not XML or carries no valid
/// `numberOfRecords`.
pub fn parse_search_response(body: &str, url: &str, start: u64) -> Result<SearchPage, SruError> {
    let doc = Document::parse(body).map_err(|e| SruError::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let root = doc.root_element();

    let count_node = descendant(root, NS_SRW, "numberOfRecords").ok_or_else(|| {
        SruError::MissingRecordCount {
            url: url.to_string(),
        }
    })?;
    let raw_count = count_node.text().unwrap_or_default().trim();
    let total = raw_count
        .parse::<u64>()
        .map_err(|_| SruError::InvalidRecordCount {
            url: url.to_string(),
            value: raw_count.to_string(),
        })?;

    let records = root
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name((NS_SRW, "record")))
        .map(|record| {
            let position = child(record, NS_SRW, "recordPosition")
                .and_then(text_of)
                .and_then(|p| p.parse::<u64>().ok());
            let url = descendant(record, NS_DDDX, "metadataKey")
                .and_then(text_of)
                .map(str::to_string);
            if url.is_none() {
                warn!(?position, "search record has no metadataKey; skipping");
            }
            SearchRecord { position, url }
        })
        .collect();

    Ok(SearchPage {
        total,
        start,
        records,
    })
}

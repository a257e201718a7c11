//! SRU (Search/Retrieve via URL) discovery of issue manifest URLs.
//!
//! # Architecture
//!
//! - [`SruClient`] - Validates queries against the [`CollectionRegistry`] and opens cursors
//! - [`SearchCursor`] - Explicit pagination state; one request per [`SearchCursor::next_page`]
//! - [`SearchPage`] - Total record count plus the page's records in server order
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use kb_harvester::sru::{DEFAULT_SRU_ENDPOINT, SearchQuery, SruClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sru = SruClient::new(reqwest::Client::new(), DEFAULT_SRU_ENDPOINT, Duration::from_secs(5))?;
//! let mut cursor = sru.search(SearchQuery::for_ppn("832675288"))?;
//! while let Some(page) = cursor.next_page().await? {
//!     for url in page.urls() {
//!         println!("{url}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod collection;
mod error;
mod paginator;
mod response;

pub use collection::{Collection, CollectionRegistry, DDD};
pub use error::SruError;
pub use paginator::{
    DEFAULT_PAGE_DELAY, DEFAULT_PAGE_SIZE, DEFAULT_SRU_ENDPOINT, MAX_PAGE_SIZE, SearchCursor,
    SearchQuery, SortOrder, SruClient,
};
pub use response::{SearchPage, SearchRecord, parse_search_response};

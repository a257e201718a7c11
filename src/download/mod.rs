//! HTTP client and digest-checked binary downloads.
//!
//! This module provides the shared [`HttpClient`] used by every network
//! component and the [`BinaryDownloader`] that stores page images, ALTO
//! files, article text and PDFs.
//!
//! # Features
//!
//! - Skip-if-present: an existing file with the manifest's MD5 is never refetched
//! - Streaming downloads hashed on the fly (memory-efficient for large scans)
//! - Digest mismatches are reported, not enforced
//! - Fixed politeness pause after every network fetch
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use kb_harvester::download::{BinaryDownloader, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = BinaryDownloader::new(HttpClient::new()?, Duration::from_secs(1));
//! let outcome = downloader
//!     .ensure(
//!         "https://example.com/page.jp2",
//!         "d41d8cd98f00b204e9800998ecf8427e",
//!         "page.jp2",
//!         Path::new("./data/issue"),
//!     )
//!     .await?;
//! println!("fetched: {}", outcome.was_fetched());
//! # Ok(())
//! # }
//! ```

mod binary;
mod checksum;
mod client;
mod constants;
mod error;

pub use binary::{BinaryDownloader, FetchOutcome};
pub use checksum::{digests_match, file_md5, md5_hex};
pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_BINARY_DELAY, READ_TIMEOUT_SECS};
pub use error::DownloadError;

// Note: no module-local Result alias; use `Result<T, DownloadError>` explicitly.

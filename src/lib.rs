//! KB Newspaper Harvester Library
//!
//! Harvests digitized newspaper issues from the KB (National Library of the
//! Netherlands) archive: every issue of a newspaper title, identified by its
//! PPN, is discovered through SRU search and stored on disk together with its
//! OAI header, DIDL manifest and binaries.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`sru`] - Paginated SRU search yielding manifest URLs
//! - [`manifest`] - OAI-PMH manifest retrieval and typed DIDL accessors
//! - [`download`] - Shared HTTP client and MD5-checked binary downloads
//! - [`ledger`] - Append-only URL and error ledgers used as work queues
//! - [`harvester`] - Two-phase orchestration and the on-disk layout
//! - [`xml`] - Namespaces and tree helpers shared by the parsers

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod harvester;
pub mod ledger;
pub mod manifest;
pub mod sru;
pub mod xml;

mod user_agent;

// Re-export commonly used types
pub use download::{BinaryDownloader, DownloadError, FetchOutcome, HttpClient};
pub use harvester::{HarvestConfig, HarvestError, HarvestStats, Harvester, Politeness, WorkSource};
pub use ledger::{ErrorLedger, LedgerEntry, LedgerError, UrlLedger};
pub use manifest::{AssetDescriptor, AssetRole, Manifest, ManifestError, ManifestFetcher};
pub use sru::{SearchCursor, SearchQuery, SruClient, SruError};

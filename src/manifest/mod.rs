//! Issue manifests: OAI-PMH `GetRecord` responses carrying a DIDL tree.
//!
//! # Architecture
//!
//! - [`ManifestFetcher`] - One GET per manifest URL, API key embedded in the path
//! - [`FetchedManifest`] - Raw response body tied to the queued URL
//! - [`Manifest`] - Parsed view: embedded error, header, DIDL, identity and assets
//! - [`IssueAssets`] - Pages, articles and the optional PDF in download order

mod document;
mod error;
mod fetcher;
mod parser;

pub use document::Manifest;
pub use error::{ManifestError, NETWORK_FAILURE_CODE};
pub use fetcher::{FetchedManifest, ManifestFetcher, OAI_PATH_MARKER, with_api_key};
pub use parser::{AssetDescriptor, AssetRole, IssueAssets, IssueIdentity, issue_assets, issue_identity};

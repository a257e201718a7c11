//! Two-phase harvest orchestration.
//!
//! # Phases
//!
//! 1. **Discovery** ([`Harvester::harvest_urls`]): page through the SRU search
//!    for a PPN and append every manifest URL to `issues-<ppn>.txt`.
//! 2. **Materialization** ([`Harvester::harvest_issues`]): read the URL ledger
//!    or the error ledger as a work queue and store each issue: its OAI
//!    header, its DIDL manifest and every page, article and PDF binary.
//!
//! Requests never overlap. Only configuration errors, failure to create the
//! root directory and ledger I/O failures stop a run; everything else is
//! logged (and, for manifest failures, ledgered) before moving on.

mod config;
mod error;
mod layout;
mod stats;

use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

pub use config::{DEFAULT_ISSUE_DELAY, HarvestConfig, Politeness, WorkSource};
pub use error::HarvestError;
pub use layout::HarvestLayout;
pub use stats::{HarvestStats, IssueOutcome};

use crate::download::{BinaryDownloader, HttpClient};
use crate::ledger::{ErrorLedger, LedgerEntry, UrlLedger};
use crate::manifest::{
    FetchedManifest, IssueAssets, IssueIdentity, ManifestError, ManifestFetcher,
};
use crate::sru::{CollectionRegistry, SearchQuery, SruClient};

/// Everything extracted from a manifest before anything is written.
struct PreparedIssue {
    identity: IssueIdentity,
    header_xml: String,
    didl_xml: String,
    assets: IssueAssets,
}

impl PreparedIssue {
    fn from_manifest(fetched: &FetchedManifest) -> Result<Self, ManifestError> {
        let manifest = fetched.open()?;
        Ok(Self {
            identity: manifest.identity()?,
            header_xml: manifest.header_xml()?,
            didl_xml: manifest.didl_xml()?,
            assets: manifest.assets()?,
        })
    }
}

/// Orchestrates discovery and materialization for one data directory.
#[derive(Debug)]
pub struct Harvester {
    config: HarvestConfig,
    layout: HarvestLayout,
    sru: SruClient,
    fetcher: ManifestFetcher,
    downloader: BinaryDownloader,
    errors: ErrorLedger,
}

impl Harvester {
    /// Validates `config`, creates the root directory and builds the clients.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidConfig`] before any I/O when the
    /// configuration is rejected, [`HarvestError::Filesystem`] when the root
    /// directory cannot be created and [`HarvestError::Client`] when the
    /// HTTP client cannot be built.
    pub async fn new(config: HarvestConfig) -> Result<Self, HarvestError> {
        Self::with_client(config, HttpClient::new()?).await
    }

    /// Like [`Harvester::new`] with a caller-supplied HTTP client.
    ///
    /// # Errors
    ///
    /// See [`Harvester::new`].
    pub async fn with_client(config: HarvestConfig, client: HttpClient) -> Result<Self, HarvestError> {
        let registry = CollectionRegistry::default();
        config.validate(&registry)?;
        let sru = SruClient::new(
            client.inner().clone(),
            &config.sru_endpoint,
            config.politeness.page_delay,
        )
        .map_err(|e| HarvestError::invalid_config(e.to_string()))?
        .with_registry(registry);

        fs::create_dir_all(&config.root)
            .await
            .map_err(|source| HarvestError::Filesystem {
                path: config.root.clone(),
                source,
            })?;

        let layout = HarvestLayout::new(&config.root);
        let errors = ErrorLedger::new(layout.error_ledger());
        let fetcher = ManifestFetcher::new(client.inner().clone(), config.api_key.clone());
        let downloader = BinaryDownloader::new(client, config.politeness.binary_delay);

        info!(root = %config.root.display(), "harvester ready");
        Ok(Self {
            config,
            layout,
            sru,
            fetcher,
            downloader,
            errors,
        })
    }

    /// Returns the on-disk layout.
    #[must_use]
    pub fn layout(&self) -> &HarvestLayout {
        &self.layout
    }

    /// Returns the error ledger.
    #[must_use]
    pub fn error_ledger(&self) -> &ErrorLedger {
        &self.errors
    }

    /// Returns the URL ledger for `ppn`.
    #[must_use]
    pub fn url_ledger(&self, ppn: &str) -> UrlLedger {
        UrlLedger::new(self.layout.url_ledger(ppn))
    }

    /// Runs discovery (unless `discover` is false) followed by materialization.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error of either phase.
    pub async fn run(
        &self,
        ppn: &str,
        discover: bool,
        source: WorkSource,
    ) -> Result<HarvestStats, HarvestError> {
        let mut stats = HarvestStats::new();
        if discover {
            stats.merge(&self.harvest_urls(ppn).await?);
        } else {
            debug!("skipping URL discovery");
        }
        stats.merge(&self.harvest_issues(ppn, source).await?);
        info!(%stats, "harvest finished");
        Ok(stats)
    }

    /// Discovery phase: appends every manifest URL found for `ppn` to its URL ledger.
    ///
    /// A search with zero results leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Search`] when any page fails; URLs of pages
    /// fetched before the failure stay in the ledger.
    #[instrument(skip(self))]
    pub async fn harvest_urls(&self, ppn: &str) -> Result<HarvestStats, HarvestError> {
        validate_ppn(ppn)?;
        let query = SearchQuery::for_ppn(ppn)
            .with_collection(&self.config.collection)
            .with_page_size(self.config.page_size);
        let mut cursor = self.sru.search(query)?;
        let ledger = self.url_ledger(ppn);
        let mut stats = HarvestStats::new();

        while let Some(page) = cursor.next_page().await? {
            let urls: Vec<&str> = page.urls().collect();
            ledger.append_all(urls.as_slice()).await?;
            stats.record_discovered(urls.len());
            info!(
                start = page.start,
                total = page.total,
                urls = urls.len(),
                "search page stored"
            );
        }

        info!(
            urls = stats.urls_discovered(),
            requests = cursor.requests_made(),
            ledger = %ledger.path().display(),
            "discovery finished"
        );
        Ok(stats)
    }

    /// Materialization phase: stores every issue queued in `source`.
    ///
    /// The queue is read once up front, so entries appended to the error
    /// ledger during a retry pass wait for the next pass.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingUrlLedger`] when discovery has not run
    /// for `ppn`, or [`HarvestError::Ledger`] when a ledger cannot be read or
    /// appended to.
    #[instrument(skip(self))]
    pub async fn harvest_issues(
        &self,
        ppn: &str,
        source: WorkSource,
    ) -> Result<HarvestStats, HarvestError> {
        validate_ppn(ppn)?;
        let queue = match source {
            WorkSource::DiscoveredUrls => {
                let ledger = self.url_ledger(ppn);
                match ledger.read_queue().await {
                    Ok(queue) => queue,
                    Err(e) if e.is_missing() => {
                        return Err(HarvestError::MissingUrlLedger {
                            ppn: ppn.to_string(),
                            path: ledger.path().to_path_buf(),
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            WorkSource::ErrorLedger => self.errors.read_queue().await?,
        };

        info!(issues = queue.len(), "materializing issues");
        let mut stats = HarvestStats::new();
        for (index, url) in queue.iter().enumerate() {
            debug!(issue = index + 1, of = queue.len(), "next issue");
            let outcome = self.harvest_issue(url, &mut stats).await?;
            stats.record_issue(outcome);
            pause(self.config.politeness.issue_delay).await;
        }

        info!(%stats, "materialization finished");
        Ok(stats)
    }

    /// Fetches one manifest and stores the issue it describes.
    ///
    /// Manifest failures are reported through the returned [`IssueOutcome`];
    /// protocol and retrieval failures are appended to the error ledger with
    /// `url` as queued.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Ledger`] only when the error ledger cannot be
    /// appended to.
    #[instrument(skip(self, stats))]
    pub async fn harvest_issue(
        &self,
        url: &str,
        stats: &mut HarvestStats,
    ) -> Result<IssueOutcome, HarvestError> {
        let fetched = match self.fetcher.fetch(url).await {
            Ok(fetched) => fetched,
            Err(error) => return self.record_failure(url, &error).await,
        };
        let issue = match PreparedIssue::from_manifest(&fetched) {
            Ok(issue) => issue,
            Err(error) => return self.record_failure(url, &error).await,
        };

        let issue_id = issue.identity.issue_id.as_str();
        info!(
            issue_id,
            newspaper_ppn = %issue.identity.newspaper_ppn,
            assets = issue.assets.len(),
            "storing issue"
        );

        let dir = self.layout.issue_dir(issue_id);
        if let Err(error) = fs::create_dir_all(&dir).await {
            warn!(path = %dir.display(), %error, "could not create issue directory; continuing");
        }
        write_document(&self.layout.header_file(issue_id), &issue.header_xml).await;
        write_document(&self.layout.didl_file(issue_id), &issue.didl_xml).await;

        for asset in issue.assets.iter() {
            match self
                .downloader
                .ensure(&asset.url, &asset.md5, &asset.filename, &dir)
                .await
            {
                Ok(outcome) => stats.record_asset(&outcome),
                Err(error) => {
                    warn!(role = %asset.role, url = %asset.url, %error, "asset failed; continuing");
                    stats.record_asset_failure();
                }
            }
        }

        Ok(IssueOutcome::Completed)
    }

    async fn record_failure(
        &self,
        url: &str,
        error: &ManifestError,
    ) -> Result<IssueOutcome, HarvestError> {
        let Some(code) = error.ledger_code() else {
            warn!(url, %error, "incomplete manifest; skipping issue");
            return Ok(IssueOutcome::Incomplete);
        };

        warn!(url, %error, code = %code, "issue failed; recorded in error ledger");
        self.errors.append(&LedgerEntry::new(url, code)).await?;
        Ok(match error {
            ManifestError::Protocol { .. } => IssueOutcome::ProtocolError,
            _ => IssueOutcome::RetrievalError,
        })
    }
}

/// PPNs name ledger files, so they must be a single plain path segment.
fn validate_ppn(ppn: &str) -> Result<(), HarvestError> {
    if ppn.trim().is_empty() {
        return Err(HarvestError::invalid_config("PPN must not be empty"));
    }
    if ppn.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '\\')) || ppn == ".." {
        return Err(HarvestError::invalid_config(format!(
            "PPN '{ppn}' must not contain whitespace or path separators"
        )));
    }
    Ok(())
}

/// Header and DIDL documents are always rewritten.
async fn write_document(path: &Path, contents: &str) {
    match fs::write(path, contents).await {
        Ok(()) => debug!(path = %path.display(), "document written"),
        Err(e) => error!(path = %path.display(), error = %e, "could not write document"),
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

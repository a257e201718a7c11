//! Per-run counters.

use std::fmt;

use crate::download::FetchOutcome;

/// How one issue attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// Manifest stored and every asset attempted.
    Completed,
    /// Embedded OAI-PMH error; ledgered.
    ProtocolError,
    /// Manifest could not be retrieved; ledgered.
    RetrievalError,
    /// Manifest lacked data needed to store the issue; logged only.
    Incomplete,
}

/// Counters for one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    urls_discovered: usize,
    issues_completed: usize,
    protocol_errors: usize,
    retrieval_errors: usize,
    incomplete_issues: usize,
    assets_downloaded: usize,
    assets_skipped: usize,
    assets_failed: usize,
    integrity_warnings: usize,
}

impl HarvestStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs appended to the URL ledger by discovery.
    #[must_use]
    pub fn urls_discovered(&self) -> usize {
        self.urls_discovered
    }

    #[must_use]
    pub fn issues_completed(&self) -> usize {
        self.issues_completed
    }

    #[must_use]
    pub fn protocol_errors(&self) -> usize {
        self.protocol_errors
    }

    #[must_use]
    pub fn retrieval_errors(&self) -> usize {
        self.retrieval_errors
    }

    #[must_use]
    pub fn incomplete_issues(&self) -> usize {
        self.incomplete_issues
    }

    /// Returns the number of issue attempts (every outcome).
    #[must_use]
    pub fn issues_attempted(&self) -> usize {
        self.issues_completed + self.protocol_errors + self.retrieval_errors + self.incomplete_issues
    }

    #[must_use]
    pub fn assets_downloaded(&self) -> usize {
        self.assets_downloaded
    }

    #[must_use]
    pub fn assets_skipped(&self) -> usize {
        self.assets_skipped
    }

    #[must_use]
    pub fn assets_failed(&self) -> usize {
        self.assets_failed
    }

    #[must_use]
    pub fn integrity_warnings(&self) -> usize {
        self.integrity_warnings
    }

    pub(crate) fn record_discovered(&mut self, count: usize) {
        self.urls_discovered += count;
    }

    pub(crate) fn record_issue(&mut self, outcome: IssueOutcome) {
        match outcome {
            IssueOutcome::Completed => self.issues_completed += 1,
            IssueOutcome::ProtocolError => self.protocol_errors += 1,
            IssueOutcome::RetrievalError => self.retrieval_errors += 1,
            IssueOutcome::Incomplete => self.incomplete_issues += 1,
        }
    }

    pub(crate) fn record_asset(&mut self, outcome: &FetchOutcome) {
        if outcome.was_fetched() {
            self.assets_downloaded += 1;
        } else {
            self.assets_skipped += 1;
        }
        if outcome.has_integrity_warning() {
            self.integrity_warnings += 1;
        }
    }

    pub(crate) fn record_asset_failure(&mut self) {
        self.assets_failed += 1;
    }

    /// Adds `other`'s counters to this one.
    pub fn merge(&mut self, other: &HarvestStats) {
        self.urls_discovered += other.urls_discovered;
        self.issues_completed += other.issues_completed;
        self.protocol_errors += other.protocol_errors;
        self.retrieval_errors += other.retrieval_errors;
        self.incomplete_issues += other.incomplete_issues;
        self.assets_downloaded += other.assets_downloaded;
        self.assets_skipped += other.assets_skipped;
        self.assets_failed += other.assets_failed;
        self.integrity_warnings += other.integrity_warnings;
    }
}

impl fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} urls discovered; issues: {} completed, {} protocol errors, {} retrieval errors, {} incomplete; \
             assets: {} downloaded, {} skipped, {} failed, {} integrity warnings",
            self.urls_discovered,
            self.issues_completed,
            self.protocol_errors,
            self.retrieval_errors,
            self.incomplete_issues,
            self.assets_downloaded,
            self.assets_skipped,
            self.assets_failed,
            self.integrity_warnings,
        )
    }
}

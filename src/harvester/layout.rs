//! On-disk layout of a harvest.

use std::path::{Path, PathBuf};

const ERROR_LEDGER_FILE: &str = "errors.tsv";

/// Paths under the root data directory.
///
/// ```text
/// <root>/issues-<ppn>.txt
/// <root>/errors.tsv
/// <root>/<issue-id>/<issue-id>.oai-header.xml
/// <root>/<issue-id>/<issue-id>.didl.xml
/// <root>/<issue-id>/<asset-filename>
/// ```
#[derive(Debug, Clone)]
pub struct HarvestLayout {
    root: PathBuf,
}

impl HarvestLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn url_ledger(&self, ppn: &str) -> PathBuf {
        self.root.join(format!("issues-{ppn}.txt"))
    }

    #[must_use]
    pub fn error_ledger(&self) -> PathBuf {
        self.root.join(ERROR_LEDGER_FILE)
    }

    #[must_use]
    pub fn issue_dir(&self, issue_id: &str) -> PathBuf {
        self.root.join(issue_id)
    }

    #[must_use]
    pub fn header_file(&self, issue_id: &str) -> PathBuf {
        self.issue_dir(issue_id)
            .join(format!("{issue_id}.oai-header.xml"))
    }

    #[must_use]
    pub fn didl_file(&self, issue_id: &str) -> PathBuf {
        self.issue_dir(issue_id).join(format!("{issue_id}.didl.xml"))
    }
}

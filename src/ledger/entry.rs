//! One line of the error ledger.

/// A failed issue: the manifest URL as queued and the failure code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Manifest URL without any API key.
    pub url: String,
    /// Embedded OAI-PMH code, `http-<status>` or `network`.
    pub code: String,
}

impl LedgerEntry {
    /// Creates an entry.
    pub fn new(url: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            code: code.into(),
        }
    }

    /// Formats the entry as a tab separated line, newline included.
    ///
    /// Tabs and line breaks inside either field are replaced by spaces so one
    /// entry always stays one line.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{}\t{}\n", sanitize(&self.url), sanitize(&self.code))
    }

    /// Parses one ledger line. Returns `None` for blank lines and lines
    /// without a URL.
    ///
    /// A line with no tab is read as a URL with an empty code.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (url, code) = line.split_once('\t').unwrap_or((line, ""));
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        Some(Self::new(url, code.trim()))
    }
}

fn sanitize(field: &str) -> String {
    field.replace(['\t', '\r', '\n'], " ")
}

//! The two append-only ledger files.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use super::{LedgerEntry, LedgerError};

/// Appends `text` to `path`, creating the file when needed.
async fn append_text(path: &Path, text: &str) -> Result<(), LedgerError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| LedgerError::io(path, e))?;
    file.write_all(text.as_bytes())
        .await
        .map_err(|e| LedgerError::io(path, e))?;
    file.flush().await.map_err(|e| LedgerError::io(path, e))
}

async fn read_text(path: &Path) -> Result<String, LedgerError> {
    fs::read_to_string(path)
        .await
        .map_err(|e| LedgerError::io(path, e))
}

/// Per-PPN list of discovered manifest URLs, one per line, in search order.
///
/// Reruns append again; duplicates are kept.
#[derive(Debug, Clone)]
pub struct UrlLedger {
    path: PathBuf,
}

impl UrlLedger {
    /// Opens the ledger at `path`. Nothing is created until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when the ledger file exists.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Appends `urls` in order with a single write.
    ///
    /// An empty slice does not touch the file.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file cannot be opened or written.
    #[instrument(skip(self, urls), fields(path = %self.path.display(), count = urls.len()))]
    pub async fn append_all<S: AsRef<str>>(&self, urls: &[S]) -> Result<(), LedgerError> {
        if urls.is_empty() {
            return Ok(());
        }
        let mut text = String::new();
        for url in urls {
            text.push_str(url.as_ref().trim());
            text.push('\n');
        }
        append_text(&self.path, &text).await?;
        debug!("urls appended");
        Ok(())
    }

    /// Reads every URL as a work queue, duplicates included.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Missing`] when discovery has not run yet.
    pub async fn read_queue(&self) -> Result<Vec<String>, LedgerError> {
        let text = read_text(&self.path).await?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Tab separated `(URL, code)` log of failed issues, replayable as a work queue.
#[derive(Debug, Clone)]
pub struct ErrorLedger {
    path: PathBuf,
}

impl ErrorLedger {
    /// Opens the ledger at `path`. Nothing is created until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file cannot be opened or written.
    #[instrument(skip(self, entry), fields(path = %self.path.display(), url = %entry.url, code = %entry.code))]
    pub async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        append_text(&self.path, &entry.to_line()).await?;
        debug!("error recorded");
        Ok(())
    }

    /// Reads all entries in file order.
    ///
    /// A ledger that does not exist yet reads as empty. Unparseable lines are
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file exists but cannot be read.
    pub async fn read_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let text = match read_text(&self.path).await {
            Ok(text) => text,
            Err(LedgerError::Missing { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match LedgerEntry::parse_line(line) {
                Some(entry) => entries.push(entry),
                None => warn!(line = index + 1, "skipping unreadable error ledger line"),
            }
        }
        Ok(entries)
    }

    /// Snapshots the ledger as a retry queue: one URL per line, duplicates kept.
    ///
    /// Entries appended after the snapshot are not part of it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file exists but cannot be read.
    pub async fn read_queue(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self
            .read_entries()
            .await?
            .into_iter()
            .map(|entry| entry.url)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_url_ledger_appends_in_order_and_keeps_duplicates() {
        let dir = TempDir::new().unwrap();
        let ledger = UrlLedger::new(dir.path().join("issues-1.txt"));

        ledger.append_all(&["http://a", "http://b"]).await.unwrap();
        ledger.append_all(&["http://a"]).await.unwrap();

        assert_eq!(
            ledger.read_queue().await.unwrap(),
            vec!["http://a", "http://b", "http://a"]
        );
    }

    #[tokio::test]
    async fn test_url_ledger_empty_append_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let ledger = UrlLedger::new(dir.path().join("issues-1.txt"));

        ledger.append_all::<&str>(&[]).await.unwrap();

        assert!(!ledger.exists().await);
    }

    #[tokio::test]
    async fn test_url_ledger_missing_file() {
        let dir = TempDir::new().unwrap();
        let ledger = UrlLedger::new(dir.path().join("issues-1.txt"));

        let err = ledger.read_queue().await.unwrap_err();
        assert!(err.is_missing());
    }

    #[tokio::test]
    async fn test_error_ledger_round_trip_with_duplicates() {
        let dir = TempDir::new().unwrap();
        let ledger = ErrorLedger::new(dir.path().join("errors.tsv"));

        ledger.append(&LedgerEntry::new("http://a", "idDoesNotExist")).await.unwrap();
        ledger.append(&LedgerEntry::new("http://b", "http-503")).await.unwrap();
        ledger.append(&LedgerEntry::new("http://a", "idDoesNotExist")).await.unwrap();

        let raw = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.starts_with("http://a\tidDoesNotExist\n"));

        let entries = ledger.read_entries().await.unwrap();
        assert_eq!(entries[1], LedgerEntry::new("http://b", "http-503"));
        assert_eq!(
            ledger.read_queue().await.unwrap(),
            vec!["http://a", "http://b", "http://a"]
        );
    }

    #[tokio::test]
    async fn test_error_ledger_missing_reads_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = ErrorLedger::new(dir.path().join("errors.tsv"));
        assert!(ledger.read_queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_ledger_skips_blank_and_unreadable_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.tsv");
        std::fs::write(&path, "http://a\tx\n\n\tno-url\nhttp://b\ty\n").unwrap();

        let ledger = ErrorLedger::new(path);
        assert_eq!(ledger.read_queue().await.unwrap(), vec!["http://a", "http://b"]);
    }
}

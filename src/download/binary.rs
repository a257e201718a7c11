//! Idempotent, digest-checked storage of a single binary asset.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use md5::{Digest, Md5};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::checksum::{digests_match, file_md5, hex_encode};
use super::client::HttpClient;
use super::error::DownloadError;

/// What [`BinaryDownloader::ensure`] had to do to make the file current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file already existed with the expected digest; no request was made.
    AlreadyPresent,
    /// The file was fetched and written.
    Downloaded {
        /// Bytes written to disk.
        bytes: u64,
        /// Digest computed over the downloaded content.
        actual_md5: String,
        /// Whether `actual_md5` equals the digest declared by the manifest.
        digest_matches: bool,
    },
}

impl FetchOutcome {
    /// Returns true when a network fetch happened.
    #[must_use]
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }

    /// Returns true when downloaded content failed the digest comparison.
    #[must_use]
    pub fn has_integrity_warning(&self) -> bool {
        matches!(
            self,
            Self::Downloaded {
                digest_matches: false,
                ..
            }
        )
    }
}

/// Fetches binaries only when the local copy is missing or stale.
#[derive(Debug, Clone)]
pub struct BinaryDownloader {
    client: HttpClient,
    fetch_delay: Duration,
}

impl BinaryDownloader {
    /// Creates a downloader that pauses `fetch_delay` after every network fetch.
    #[must_use]
    pub fn new(client: HttpClient, fetch_delay: Duration) -> Self {
        Self {
            client,
            fetch_delay,
        }
    }

    /// Ensures `dir/filename` exists with MD5 `expected_md5`.
    ///
    /// An existing file whose digest matches is left alone without touching the
    /// network. Otherwise the asset is fetched and written. A digest mismatch on
    /// the fetched content is logged but the content is kept.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the filename would escape `dir`, the
    /// request fails or returns a non-success status, or writing fails.
    #[instrument(skip(self, expected_md5, dir), fields(url = %url, filename = %filename))]
    pub async fn ensure(
        &self,
        url: &str,
        expected_md5: &str,
        filename: &str,
        dir: &Path,
    ) -> Result<FetchOutcome, DownloadError> {
        if !is_plain_filename(filename) {
            return Err(DownloadError::unsafe_filename(url, filename));
        }
        let path = dir.join(filename);

        if self.matches_existing(&path, expected_md5).await {
            debug!(path = %path.display(), "already downloaded with matching digest");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        debug!("downloading");
        let result = self.fetch_to_file(url, &path).await;
        self.pause().await;
        let (bytes, actual_md5) = result?;

        let digest_matches = digests_match(&actual_md5, expected_md5);
        if digest_matches {
            debug!(md5 = %actual_md5, "MD5 checksum matches download");
        } else {
            warn!(
                expected = %expected_md5,
                actual = %actual_md5,
                path = %path.display(),
                "MD5 checksum mismatch; keeping downloaded content"
            );
        }
        info!(path = %path.display(), bytes, "saved");

        Ok(FetchOutcome::Downloaded {
            bytes,
            actual_md5,
            digest_matches,
        })
    }

    async fn matches_existing(&self, path: &Path, expected_md5: &str) -> bool {
        match file_md5(path).await {
            Ok(actual) => {
                let matches = digests_match(&actual, expected_md5);
                if !matches {
                    debug!(path = %path.display(), actual = %actual, "existing file digest differs");
                }
                matches
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => false,
            Err(error) => {
                debug!(path = %path.display(), error = %error, "could not hash existing file");
                false
            }
        }
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<(u64, String), DownloadError> {
        let response = self
            .client
            .inner()
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        if !response.status().is_success() {
            return Err(DownloadError::http_status(url, response.status().as_u16()));
        }

        let file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

        let stream_result = stream_to_file(file, response, url, path).await;
        if stream_result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        stream_result
    }

    async fn pause(&self) {
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
    }
}

/// Streams the response body to disk, hashing as it goes.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<(u64, String), DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut hasher = Md5::new();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
        hasher.update(&chunk);
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

    Ok((bytes_written, hex_encode(&hasher.finalize())))
}

/// Manifest filenames must name a file directly inside the issue directory.
fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
}

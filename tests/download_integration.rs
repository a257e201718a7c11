//! Integration tests for the download module.
//!
//! These tests verify skip-if-present, streaming writes and digest reporting
//! with mock HTTP servers.

use std::time::{Duration, Instant};

use kb_harvester::download::{BinaryDownloader, DownloadError, FetchOutcome, HttpClient, md5_hex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

fn downloader() -> BinaryDownloader {
    BinaryDownloader::new(HttpClient::new().expect("client"), Duration::ZERO)
}

/// Helper to create a mock server with a file endpoint expecting `hits` requests.
async fn setup_mock_file(path_str: &str, content: &[u8], hits: u64) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(hits)
        .mount(&mock_server)
        .await;

    mock_server
}

#[tokio::test]
async fn test_download_full_flow_preserves_content() {
    let content = b"JP2 scan of page one\nwith several lines\n";
    let mock_server = setup_mock_file("/files/p1.jp2", content, 1).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let url = format!("{}/files/p1.jp2", mock_server.uri());
    let outcome = downloader()
        .ensure(&url, &md5_hex(content), "p1.jp2", temp_dir.path())
        .await
        .expect("download should succeed");

    assert!(outcome.was_fetched());
    assert!(!outcome.has_integrity_warning());
    let downloaded = std::fs::read(temp_dir.path().join("p1.jp2")).expect("should read file");
    assert_eq!(downloaded, content);
}

#[tokio::test]
async fn test_download_skips_existing_file_with_matching_digest() {
    let content = b"already here";
    let mock_server = setup_mock_file("/files/p1.jp2", content, 0).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp_dir.path().join("p1.jp2"), content).expect("seed file");

    let url = format!("{}/files/p1.jp2", mock_server.uri());
    let outcome = downloader()
        .ensure(&url, &md5_hex(content), "p1.jp2", temp_dir.path())
        .await
        .expect("skip should succeed");

    assert_eq!(outcome, FetchOutcome::AlreadyPresent);
}

#[tokio::test]
async fn test_download_digest_comparison_ignores_case() {
    let content = b"case";
    let mock_server = setup_mock_file("/files/a.xml", content, 0).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp_dir.path().join("a.xml"), content).expect("seed file");

    let url = format!("{}/files/a.xml", mock_server.uri());
    let outcome = downloader()
        .ensure(&url, &md5_hex(content).to_uppercase(), "a.xml", temp_dir.path())
        .await
        .expect("skip should succeed");

    assert!(!outcome.was_fetched());
}

#[tokio::test]
async fn test_download_refetches_stale_file_exactly_once() {
    let content = b"fresh content";
    let mock_server = setup_mock_file("/files/p1.jp2", content, 1).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(temp_dir.path().join("p1.jp2"), b"truncated").expect("seed file");

    let url = format!("{}/files/p1.jp2", mock_server.uri());
    let outcome = downloader()
        .ensure(&url, &md5_hex(content), "p1.jp2", temp_dir.path())
        .await
        .expect("download should succeed");

    assert!(outcome.was_fetched());
    assert_eq!(
        std::fs::read(temp_dir.path().join("p1.jp2")).expect("read"),
        content
    );
}

#[tokio::test]
async fn test_download_empty_body_matches_empty_md5() {
    let mock_server = setup_mock_file("/files/f.jp2", b"", 1).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let url = format!("{}/files/f.jp2", mock_server.uri());
    let outcome = downloader()
        .ensure(&url, EMPTY_MD5, "f.jp2", temp_dir.path())
        .await
        .expect("download should succeed");

    assert_eq!(
        outcome,
        FetchOutcome::Downloaded {
            bytes: 0,
            actual_md5: EMPTY_MD5.to_string(),
            digest_matches: true,
        }
    );
    assert!(temp_dir.path().join("f.jp2").exists());
}

#[tokio::test]
async fn test_download_digest_mismatch_keeps_content_and_warns() {
    let content = b"not empty";
    let mock_server = setup_mock_file("/files/f.jp2", content, 1).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let url = format!("{}/files/f.jp2", mock_server.uri());
    let outcome = downloader()
        .ensure(&url, EMPTY_MD5, "f.jp2", temp_dir.path())
        .await
        .expect("mismatch is not an error");

    assert!(outcome.has_integrity_warning());
    assert_eq!(
        std::fs::read(temp_dir.path().join("f.jp2")).expect("read"),
        content
    );
}

#[tokio::test]
async fn test_download_404_is_retrieval_error_and_leaves_no_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/missing.jp2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let url = format!("{}/files/missing.jp2", mock_server.uri());
    let err = downloader()
        .ensure(&url, EMPTY_MD5, "missing.jp2", temp_dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::HttpStatus { status: 404, .. }));
    assert!(err.is_retrieval());
    assert!(!temp_dir.path().join("missing.jp2").exists());
}

#[tokio::test]
async fn test_download_rejects_filename_outside_directory() {
    let mock_server = setup_mock_file("/files/x", b"x", 0).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let url = format!("{}/files/x", mock_server.uri());
    let err = downloader()
        .ensure(&url, EMPTY_MD5, "../escape.jp2", temp_dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::UnsafeFilename { .. }));
}

#[tokio::test]
async fn test_download_pauses_after_fetch_but_not_after_skip() {
    let content = b"paced";
    let mock_server = setup_mock_file("/files/p.jp2", content, 1).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let paced = BinaryDownloader::new(HttpClient::new().expect("client"), Duration::from_millis(200));
    let url = format!("{}/files/p.jp2", mock_server.uri());

    let started = Instant::now();
    paced
        .ensure(&url, &md5_hex(content), "p.jp2", temp_dir.path())
        .await
        .expect("download");
    assert!(started.elapsed() >= Duration::from_millis(200));

    let started = Instant::now();
    let outcome = paced
        .ensure(&url, &md5_hex(content), "p.jp2", temp_dir.path())
        .await
        .expect("skip");
    assert_eq!(outcome, FetchOutcome::AlreadyPresent);
    assert!(started.elapsed() < Duration::from_millis(200));
}

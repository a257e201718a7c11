//! Shared HTTP client used for SRU searches, manifest retrieval and binaries.
//!
//! One client is built per run and cloned into every component so all traffic
//! shares connection pooling, timeouts and the project User-Agent.

use std::panic::{AssertUnwindSafe, catch_unwind, set_hook, take_hook};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client wrapper with the harvester's networking defaults.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with default timeouts (30s connect, 5min read).
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] when the builder fails.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] when the builder fails.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = build_client(connect_timeout_secs, read_timeout_secs)?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, DownloadError> {
    match try_build_client(connect_timeout_secs, read_timeout_secs, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!(
                "HTTP client builder panicked while loading system proxy settings; retrying with env-proxy fallback"
            );
            match try_build_client(connect_timeout_secs, read_timeout_secs, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Build(error)) => {
                    Err(DownloadError::client_build(error.to_string()))
                }
                Err(BuildClientFailure::Panic) => Err(DownloadError::client_build(
                    "builder panicked while applying env-proxy fallback",
                )),
            }
        }
        Err(BuildClientFailure::Build(error)) => {
            Err(DownloadError::client_build(error.to_string()))
        }
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

// `catch_unwind` does not suppress panic-hook stderr output, so the hook is
// silenced while a guarded build runs.
static CLIENT_BUILD_PANIC_HOOK_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn try_build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind_silent(AssertUnwindSafe(move || {
        let mut builder = base_client_builder(connect_timeout_secs, read_timeout_secs);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn catch_unwind_silent<F, T>(operation: F) -> Result<T, Box<dyn std::any::Any + Send + 'static>>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    let _panic_hook_guard = CLIENT_BUILD_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(operation);
    set_hook(previous_hook);
    outcome
}

fn base_client_builder(connect_timeout_secs: u64, read_timeout_secs: u64) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

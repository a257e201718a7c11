//! CLI argument definitions using clap derive macros.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use kb_harvester::harvester::{HarvestConfig, Politeness, WorkSource};
use kb_harvester::sru::{DEFAULT_PAGE_SIZE, DEFAULT_SRU_ENDPOINT, MAX_PAGE_SIZE};

/// Harvest newspaper issues from the KB archive by PPN.
///
/// Discovers every issue of the newspaper through SRU search, then stores each
/// issue's OAI header, DIDL manifest, page scans, ALTO and article text, and PDF.
#[derive(Parser)]
#[command(name = "kb-harvester")]
#[command(author, version, about)]
pub struct Args {
    /// The PPN of the newspaper to harvest
    #[arg(value_name = "PPN")]
    pub ppn: String,

    /// Directory to store data in
    #[arg(short, long, value_name = "DIRECTORY", default_value = "data/")]
    pub dir: PathBuf,

    /// API key embedded into manifest URLs
    #[arg(long, env = "KB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Retry the issues recorded in errors.tsv instead of the discovered URLs
    #[arg(long)]
    pub retry_errors: bool,

    /// Skip URL discovery and reuse the existing issues-<PPN>.txt
    #[arg(long)]
    pub skip_urls: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Pause between search pages in milliseconds
    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub page_delay_ms: u64,

    /// Pause after each issue in milliseconds
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub issue_delay_ms: u64,

    /// Pause after each downloaded file in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub binary_delay_ms: u64,

    /// Records requested per search page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_SIZE)))]
    pub page_size: u32,

    /// SRU search endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_SRU_ENDPOINT)]
    pub sru_url: String,
}

// Hand-written so the API key never reaches the logs.
impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("ppn", &self.ppn)
            .field("dir", &self.dir)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("retry_errors", &self.retry_errors)
            .field("skip_urls", &self.skip_urls)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("log_file", &self.log_file)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("issue_delay_ms", &self.issue_delay_ms)
            .field("binary_delay_ms", &self.binary_delay_ms)
            .field("page_size", &self.page_size)
            .field("sru_url", &self.sru_url)
            .finish()
    }
}

impl Args {
    /// Builds the harvest configuration.
    #[must_use]
    pub fn to_config(&self) -> HarvestConfig {
        HarvestConfig::new(&self.dir)
            .with_api_key(self.api_key.clone())
            .with_politeness(Politeness {
                page_delay: Duration::from_millis(self.page_delay_ms),
                issue_delay: Duration::from_millis(self.issue_delay_ms),
                binary_delay: Duration::from_millis(self.binary_delay_ms),
            })
            .with_sru_endpoint(&self.sru_url)
            .with_page_size(self.page_size)
    }

    /// Which ledger feeds the materialization phase.
    #[must_use]
    pub fn work_source(&self) -> WorkSource {
        if self.retry_errors {
            WorkSource::ErrorLedger
        } else {
            WorkSource::DiscoveredUrls
        }
    }

    /// Whether to run URL discovery first.
    ///
    /// A retry pass works from the error ledger, so it never rediscovers.
    #[must_use]
    pub fn discover(&self) -> bool {
        !self.skip_urls && !self.retry_errors
    }
}

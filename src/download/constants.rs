//! Constants for the download module (timeouts, politeness delays).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large page images and PDFs).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Pause after every binary that was actually fetched from the network.
pub const DEFAULT_BINARY_DELAY: Duration = Duration::from_secs(1);

//! Append-only ledger files that double as resumable work queues.
//!
//! - [`UrlLedger`] - `issues-<ppn>.txt`, the discovered manifest URLs
//! - [`ErrorLedger`] - `errors.tsv`, failed issues with their failure code
//!
//! Neither ledger deduplicates: a rerun appends again and a retry pass
//! processes every line, so progress is at-least-once.

mod entry;
mod error;
mod files;

pub use entry::LedgerEntry;
pub use error::LedgerError;
pub use files::{ErrorLedger, UrlLedger};

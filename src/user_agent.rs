//! Shared User-Agent string for all harvester HTTP traffic.
//!
//! The archive asks clients to identify themselves; every request (search,
//! manifest, binaries) carries the same string.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/bencomp/KB-harvester";

/// Default User-Agent (identifies the tool and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("kb-harvester/{version} (newspaper-harvester; +{PROJECT_UA_URL})")
}

//! Fatal error taxonomy for a sync run.
//!
//! A run either writes one complete feed or fails with one of these errors
//! and leaves the previous feed untouched. Candidates that fail extraction
//! are not errors; they are skipped and counted in [`crate::scrapers`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Invalid configuration (bad URL, zero period, unreadable config file).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Network failure while fetching the upstream page.
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status.
    #[error("fetch failed for {url}: {code} {reason}")]
    Status {
        url: String,
        code: u16,
        reason: String,
    },

    /// Local HTML snapshot could not be read.
    #[error("cannot read snapshot {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Feed could not be rendered as JSON.
    #[error("cannot serialize feed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Destination directory or file could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

//! Command-line interface definitions for speranza_sync.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also be supplied through an environment variable, which
//! suits cron and CI schedulers. Unset options fall back to the YAML config
//! file and then to built-in defaults (see [`crate::config`]).

use crate::scrapers::ExtractorKind;
use chrono::{DateTime, Utc};
use clap::Parser;

/// Command-line arguments for the sync job.
///
/// # Examples
///
/// ```sh
/// # Scrape and write data/events.json
/// speranza_sync
///
/// # Write somewhere else, using the DOM extractor
/// speranza_sync -o /srv/www/data/events.json --extractor dom
///
/// # Replay a saved page at a fixed instant and print the feed
/// speranza_sync --input page.html --now 2025-05-06T12:00:00Z --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the events.json feed to write
    #[arg(short, long, env = "SPERANZA_OUTPUT")]
    pub output: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "SPERANZA_CONFIG")]
    pub config: Option<String>,

    /// Upstream schedule page
    #[arg(long, env = "SPERANZA_SOURCE_URL")]
    pub source_url: Option<String>,

    /// User-Agent header sent to the upstream site
    #[arg(long, env = "SPERANZA_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SPERANZA_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Strategy used to find event cards in the page
    #[arg(long, value_enum, env = "SPERANZA_EXTRACTOR")]
    pub extractor: Option<ExtractorKind>,

    /// Repeat period of every event, in milliseconds
    #[arg(long, env = "SPERANZA_PERIOD_MS")]
    pub period_ms: Option<i64>,

    /// Resolve windows against this instant instead of the clock (RFC 3339)
    #[arg(long, env = "SPERANZA_NOW")]
    pub now: Option<DateTime<Utc>>,

    /// Read the page from a saved HTML file instead of fetching it
    #[arg(long, env = "SPERANZA_INPUT")]
    pub input: Option<String>,

    /// Print the feed to stdout instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

//! # speranza_sync
//!
//! Scrapes the Speranza event schedule page and publishes the events that
//! are running now or coming up next as an `events.json` feed for the
//! Japanese schedule viewer.
//!
//! ## Usage
//!
//! ```sh
//! speranza_sync -o ./data/events.json
//! ```
//!
//! ## Architecture
//!
//! One run is a single pass:
//! 1. **Fetching**: GET the upstream page (or read a saved snapshot)
//! 2. **Extraction**: Pull event cards out of the markup; incomplete cards are skipped
//! 3. **Normalization**: Shift each card's sample window onto the current daily cycle
//! 4. **Assembly**: Canonical keys, dedup by `(eventType, map, start, end)`, sort by start
//! 5. **Output**: Atomically replace the feed file
//!
//! Fetch and write failures abort the run with a non-zero exit and leave the
//! previous feed untouched.

use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod assemble;
mod cli;
mod config;
mod cycle;
mod error;
mod models;
mod outputs;
mod scrapers;
mod utils;

use assemble::{AssembleContext, assemble_feed};
use cli::Cli;
use config::SyncConfig;
use error::SyncError;
use outputs::json;
use scrapers::fetch::{fetch_page, read_snapshot};
use scrapers::extract_cards;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Sync failed");
            eprintln!("speranza_sync failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[instrument(level = "info", skip_all)]
async fn run(args: Cli) -> Result<(), SyncError> {
    let start_time = std::time::Instant::now();
    let config = SyncConfig::from_cli(&args)?;
    info!(
        source = %config.source_url,
        output = %config.output_path.display(),
        extractor = ?config.extractor,
        period_ms = config.policy.period_ms(),
        "speranza_sync starting up"
    );

    let html = match args.input.as_deref() {
        Some(path) => read_snapshot(path).await?,
        None => fetch_page(&config.source_url, &config.fetch_options()).await?,
    };

    let extractor = config.extractor.build();
    let extraction = extract_cards(extractor.as_ref(), &html);

    let generated_at = Utc::now();
    let ctx = AssembleContext {
        policy: config.policy,
        now: args.now.unwrap_or(generated_at),
        generated_at,
        source: &config.source_url,
        id_prefix: &config.id_prefix,
    };
    let (feed, stats) = assemble_feed(&extraction.cards, &ctx);

    if args.dry_run {
        print!("{}", json::render_feed(&feed)?);
    } else {
        json::write_feed(&feed, &config.output_path).await?;
    }

    let elapsed = start_time.elapsed();
    let skipped = extraction.skipped + stats.out_of_range;
    if args.dry_run {
        info!(
            count = feed.count,
            skipped,
            duplicates = stats.duplicates,
            dry_run = true,
            ?elapsed,
            "Synced events"
        );
    } else {
        info!(
            count = feed.count,
            skipped,
            duplicates = stats.duplicates,
            path = %config.output_path.display(),
            ?elapsed,
            "Synced events"
        );
    }
    Ok(())
}

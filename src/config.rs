//! Run configuration.
//!
//! Values are resolved in this order: CLI flag or environment variable, then
//! the optional YAML config file, then the defaults below.
//!
//! ```yaml
//! # speranza.yaml
//! source_url: https://speranzaintel.com/
//! output_path: /srv/www/data/events.json
//! extractor: dom
//! period_ms: 86400000
//! timeout_secs: 20
//! ```

use crate::cli::Cli;
use crate::cycle::{CyclePolicy, DAY_MS};
use crate::error::SyncError;
use crate::scrapers::ExtractorKind;
use crate::scrapers::fetch::FetchOptions;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_SOURCE_URL: &str = "https://speranzaintel.com/";
pub const DEFAULT_OUTPUT_PATH: &str = "data/events.json";
pub const DEFAULT_USER_AGENT: &str =
    concat!("Mozilla/5.0 (compatible; speranza_sync/", env!("CARGO_PKG_VERSION"), ")");
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ID_PREFIX: &str = "speranza";

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source_url: Option<String>,
    pub output_path: Option<String>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub timeout_secs: Option<u64>,
    pub period_ms: Option<i64>,
    pub extractor: Option<ExtractorKind>,
    pub id_prefix: Option<String>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self, SyncError> {
        serde_yaml::from_str(text).map_err(|e| SyncError::Config(format!("bad config file: {e}")))
    }

    #[instrument(level = "info", skip_all, fields(%path))]
    pub fn load(path: &str) -> Result<Self, SyncError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("cannot read config {path}: {e}")))?;
        Self::from_yaml(&text)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source_url: String,
    pub output_path: PathBuf,
    pub user_agent: String,
    pub accept: String,
    pub timeout: Duration,
    pub policy: CyclePolicy,
    pub extractor: ExtractorKind,
    pub id_prefix: String,
}

impl SyncConfig {
    /// Load the config file named on the command line (if any) and resolve.
    pub fn from_cli(cli: &Cli) -> Result<Self, SyncError> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI values over file values over defaults, then validate.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, SyncError> {
        let source_url = cli
            .source_url
            .clone()
            .or(file.source_url)
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        validate_source_url(&source_url)?;

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(SyncError::Config("timeout_secs must be positive".to_string()));
        }

        let policy = CyclePolicy::with_period(cli.period_ms.or(file.period_ms).unwrap_or(DAY_MS))?;

        let config = SyncConfig {
            source_url,
            output_path: PathBuf::from(
                cli.output
                    .clone()
                    .or(file.output_path)
                    .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            ),
            user_agent: cli
                .user_agent
                .clone()
                .or(file.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            accept: file.accept.unwrap_or_else(|| DEFAULT_ACCEPT.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            policy,
            extractor: cli.extractor.or(file.extractor).unwrap_or_default(),
            id_prefix: file
                .id_prefix
                .unwrap_or_else(|| DEFAULT_ID_PREFIX.to_string()),
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            accept: self.accept.clone(),
            timeout: self.timeout,
        }
    }
}

fn validate_source_url(raw: &str) -> Result<(), SyncError> {
    let url = Url::parse(raw).map_err(|e| SyncError::Config(format!("bad source_url {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SyncError::Config(format!(
            "source_url must be http or https, got {other}"
        ))),
    }
}

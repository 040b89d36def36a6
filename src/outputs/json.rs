//! JSON output for the viewer.
//!
//! The feed is rendered as pretty-printed JSON with a trailing newline and
//! written over the previous feed in one step:
//!
//! ```text
//! data/
//! ├── events.json       # current feed
//! └── events.json.tmp   # only exists while a write is in flight
//! ```
//!
//! The temporary file lives in the same directory as the target so the final
//! rename stays on one filesystem and replaces the old feed atomically.

use crate::error::SyncError;
use crate::models::EventFeed;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Render a feed the way it is stored on disk.
pub fn render_feed(feed: &EventFeed) -> Result<String, SyncError> {
    let mut json = serde_json::to_string_pretty(feed)?;
    json.push('\n');
    Ok(json)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Create (or truncate) `path`, write `bytes` and flush them to disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Flush the directory entry so a completed rename survives a crash.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Write a [`EventFeed`] to `path`, replacing any previous feed.
///
/// Temp write -> fsync temp -> rename -> fsync dir. Parent directories are
/// created as needed. On failure the previous file at `path` is left
/// untouched and the temporary file is removed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_feed(feed: &EventFeed, path: &Path) -> Result<(), SyncError> {
    let write_err = |source: std::io::Error| SyncError::Write {
        path: path.display().to_string(),
        source,
    };

    let json = render_feed(feed)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Err(e) = fs::create_dir_all(parent).await {
        error!(dir = %parent.display(), error = %e, "Failed to create output dir");
        return Err(write_err(e));
    }

    let tmp = tmp_path_for(path);
    if let Err(e) = write_synced(&tmp, json.as_bytes()).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    sync_dir(parent).await.map_err(write_err)?;

    info!(count = feed.count, bytes = json.len(), "Wrote event feed");
    Ok(())
}

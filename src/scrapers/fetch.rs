//! Retrieving the upstream HTML, either over HTTP or from a saved snapshot.
//!
//! One request per run, no retries: any failure aborts the run before
//! anything is written.

use crate::error::SyncError;
use crate::utils::truncate_for_log;
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Request settings for [`fetch_page`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub accept: String,
    pub timeout: Duration,
}

/// GET the upstream page and return its body.
///
/// # Errors
///
/// - [`SyncError::Fetch`] on connection, timeout or body read failure
/// - [`SyncError::Status`] when the response status is not 2xx
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_page(url: &str, opts: &FetchOptions) -> Result<String, SyncError> {
    let fetch_err = |source: reqwest::Error| SyncError::Fetch {
        url: url.to_string(),
        source,
    };

    let t0 = Instant::now();
    let client = reqwest::Client::builder()
        .user_agent(opts.user_agent.as_str())
        .timeout(opts.timeout)
        .build()
        .map_err(fetch_err)?;

    let res = client
        .get(url)
        .header(ACCEPT, opts.accept.as_str())
        .send()
        .await
        .map_err(fetch_err)?;

    let status = res.status();
    if !status.is_success() {
        return Err(SyncError::Status {
            url: url.to_string(),
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let body = res.text().await.map_err(fetch_err)?;
    info!(
        status = status.as_u16(),
        bytes = body.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Fetched upstream page"
    );
    debug!(preview = %truncate_for_log(&body, 300), "Upstream body");
    Ok(body)
}

/// Read a previously saved copy of the upstream page.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn read_snapshot(path: &str) -> Result<String, SyncError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SyncError::Read {
            path: path.to_string(),
            source,
        })?;
    info!(bytes = body.len(), "Read HTML snapshot");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn opts() -> FetchOptions {
        FetchOptions {
            user_agent: "speranza-test/1.0".to_string(),
            accept: "text/html,application/xhtml+xml".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Accept one connection, answer with `response`, and hand back the
    /// raw request text.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            loop {
                let n = sock.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            sock.write_all(response.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..read]).to_string()
        });
        (format!("http://{addr}/"), handle)
    }

    #[tokio::test]
    async fn test_fetch_sends_headers_and_returns_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>",
        )
        .await;

        let body = fetch_page(&url, &opts()).await.unwrap();
        assert_eq!(body, "<html></html>");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get / "));
        assert!(request.contains("user-agent: speranza-test/1.0"));
        assert!(request.contains("accept: text/html,application/xhtml+xml"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_fatal() {
        let (url, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = fetch_page(&url, &opts()).await.unwrap_err();
        match err {
            SyncError::Status { code, reason, .. } => {
                assert_eq!(code, 503);
                assert_eq!(reason, "Service Unavailable");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetch_page(&format!("http://{addr}/"), &opts())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Fetch { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_read_error() {
        let err = read_snapshot("/definitely/not/here.html").await.unwrap_err();
        assert!(matches!(err, SyncError::Read { .. }));
    }
}

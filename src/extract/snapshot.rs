//! Snapshot input: normalise a user-supplied path or URL to page HTML.
//!
//! A [`PageSnapshot`] is what a DOM extractor reads: the page's address,
//! its `<title>`, and the serialised document. Snapshots come from a file
//! saved by the browser ("Save page as…", or a devtools `outerHTML` dump),
//! or are fetched over HTTP.
//!
//! Browsers write saved pages in place, so a CLI call racing the save can
//! see a missing or empty file. [`wait_for_snapshot`] polls for it with a
//! bounded number of attempts.

use super::poll::{poll_until, PollOutcome};
use crate::error::ExportError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// A captured chat page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Where the page was captured from. Drives service detection and the
    /// DeepSeek session lookup.
    pub url: String,
    pub title: String,
    pub html: String,
}

static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

static CANONICAL_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"link[rel="canonical"], meta[property="og:url"]"#).unwrap()
});

/// Chrome stamps saved pages with `<!-- saved from url=(0042)https://… -->`.
static RE_SAVED_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*saved from url=\(\d+\)(\S+?)\s*-->").unwrap());

impl PageSnapshot {
    /// Build a snapshot from HTML already in memory.
    ///
    /// The title is read from the document. When `url` is empty, the page's
    /// own canonical address is used if it carries one.
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let mut url = url.into();
        let (title, embedded_url) = read_head(&html);
        if url.is_empty() {
            url = embedded_url.unwrap_or_default();
        }
        Self { url, title, html }
    }

    /// Override the address the snapshot claims to come from.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

fn read_head(html: &str) -> (String, Option<String>) {
    let saved_from = RE_SAVED_FROM
        .captures(html)
        .map(|c| c[1].to_string());

    let doc = Html::parse_document(html);
    let title = doc
        .select(&TITLE_SEL)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let canonical = doc.select(&CANONICAL_SEL).find_map(|el| {
        el.value()
            .attr("href")
            .or_else(|| el.value().attr("content"))
            .map(str::to_string)
    });
    (title, canonical.or(saved_from))
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a path or URL to a snapshot.
pub async fn load_snapshot(input: &str, timeout_secs: u64) -> Result<PageSnapshot, ExportError> {
    if is_url(input) {
        download_snapshot(input, timeout_secs).await
    } else {
        read_snapshot(Path::new(input)).await
    }
}

/// Read a saved page from disk.
pub async fn read_snapshot(path: &Path) -> Result<PageSnapshot, ExportError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExportError::SnapshotNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(ExportError::Internal(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };
    let html = String::from_utf8_lossy(&bytes).into_owned();
    let mut snapshot = PageSnapshot::from_html("", html);
    if snapshot.url.is_empty() {
        snapshot.url = format!("file://{}", absolute(path).display());
    }
    debug!(
        "Read snapshot {} ({} bytes, title '{}')",
        path.display(),
        snapshot.html.len(),
        snapshot.title
    );
    Ok(snapshot)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Fetch a page over HTTP.
async fn download_snapshot(url: &str, timeout_secs: u64) -> Result<PageSnapshot, ExportError> {
    info!("Downloading page snapshot from: {}", url);

    let failed = |reason: String| ExportError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            failed(format!("timed out after {timeout_secs}s"))
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let html = response.text().await.map_err(|e| failed(e.to_string()))?;
    info!("Downloaded {} bytes", html.len());
    Ok(PageSnapshot::from_html(url, html))
}

/// Wait until a saved page exists and is non-empty, then read it.
///
/// Gives up after `attempts` probes spaced `interval` apart and reports the
/// file as missing.
pub async fn wait_for_snapshot(
    path: &Path,
    attempts: u32,
    interval: Duration,
) -> Result<PageSnapshot, ExportError> {
    let outcome = poll_until(attempts, interval, |_| async move {
        match tokio::fs::metadata(path).await {
            Ok(m) if m.len() > 0 => Some(()),
            _ => None,
        }
    })
    .await;

    match outcome {
        PollOutcome::Ready(()) => read_snapshot(path).await,
        PollOutcome::GaveUp { attempts } => {
            debug!("Snapshot {} not ready after {} attempts", path.display(), attempts);
            Err(ExportError::SnapshotNotFound {
                path: path.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://chatgpt.com/c/1"));
        assert!(is_url("http://localhost:8080/"));
        assert!(!is_url("/tmp/chat.html"));
        assert!(!is_url(""));
    }

    #[test]
    fn title_and_canonical_url() {
        let s = PageSnapshot::from_html(
            "",
            r#"<html><head><title> My chat </title>
               <link rel="canonical" href="https://claude.ai/chat/1"></head><body></body></html>"#,
        );
        assert_eq!(s.title, "My chat");
        assert_eq!(s.url, "https://claude.ai/chat/1");
    }

    #[test]
    fn saved_from_comment_supplies_url() {
        let s = PageSnapshot::from_html(
            "",
            "<!DOCTYPE html>\n<!-- saved from url=(0040)https://chat.deepseek.com/a/chat/s/abc -->\n<html><head><title>DeepSeek</title></head></html>",
        );
        assert_eq!(s.url, "https://chat.deepseek.com/a/chat/s/abc");
    }

    #[test]
    fn explicit_url_wins() {
        let s = PageSnapshot::from_html(
            "https://gemini.google.com/app/1",
            r#"<link rel="canonical" href="https://other.example/">"#,
        );
        assert_eq!(s.url, "https://gemini.google.com/app/1");
    }

    #[tokio::test]
    async fn missing_file_is_snapshot_not_found() {
        let err = read_snapshot(Path::new("/definitely/not/here.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::SnapshotNotFound { .. }));
    }

    #[tokio::test]
    async fn local_file_gets_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.html");
        std::fs::write(&path, "<title>T</title>").unwrap();
        let s = load_snapshot(path.to_str().unwrap(), 5).await.unwrap();
        assert!(s.url.starts_with("file://"));
        assert!(s.url.ends_with("chat.html"));
        assert_eq!(s.title, "T");
    }

    #[tokio::test]
    async fn wait_gives_up_on_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");
        std::fs::write(&path, "").unwrap();
        let err = wait_for_snapshot(&path, 2, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::SnapshotNotFound { .. }));
    }

    #[tokio::test]
    async fn wait_reads_ready_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ready.html");
        std::fs::write(&path, "<title>Ready</title>").unwrap();
        let s = wait_for_snapshot(&path, 3, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(s.title, "Ready");
    }
}

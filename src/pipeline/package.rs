//! Packaging: filenames, atomic file writes, ZIP bundles and clipboard copy.
//!
//! ## Filename conventions
//!
//! | Artifact                | Name                                            |
//! |-------------------------|-------------------------------------------------|
//! | page image              | `<service>_<YYYYMMDDHHMMSS>[_p<k>of<n>].png`    |
//! | page entry inside a ZIP | `chat_page_<k>.png`                             |
//! | all-pages archive       | `chat_all_pages_<epoch-ms>.zip`                 |
//! | sibling page link       | `chat_page_<k>.html`                            |
//! | conversation file       | `chat-export-<YYYY-MM-DD>.<json\|md>`            |
//! | all conversations file  | `all-chats-export-<YYYY-MM-DD>.<json\|md>`       |

use crate::config::{ExportConfig, ExportFormat};
use crate::error::ExportError;
use crate::model::ServiceId;
use crate::output::{Artifact, PageImage};
use crate::progress::NoticeLevel;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

pub const PNG_MIME: &str = "image/png";
pub const ZIP_MIME: &str = "application/zip";

// ── Filenames ────────────────────────────────────────────────────────────

/// Sibling link target used by page navigation.
pub fn page_html_name(page: usize) -> String {
    format!("chat_page_{page}.html")
}

/// Entry name of one page inside the all-pages archive.
pub fn zip_entry_name(page: usize) -> String {
    format!("chat_page_{page}.png")
}

/// Download name for one page image.
///
/// The `_p<k>of<n>` suffix appears only when the batch has several pages.
pub fn image_filename(
    service: Option<ServiceId>,
    at: DateTime<Utc>,
    page: usize,
    total: usize,
) -> String {
    let service = service.map(|s| s.as_str()).unwrap_or("chat");
    let stamp = at.format("%Y%m%d%H%M%S");
    if total > 1 {
        format!("{service}_{stamp}_p{page}of{total}.png")
    } else {
        format!("{service}_{stamp}.png")
    }
}

/// Download name for the all-pages archive.
pub fn archive_filename(at: DateTime<Utc>) -> String {
    format!("chat_all_pages_{}.zip", at.timestamp_millis())
}

/// Download name for a JSON or Markdown export.
pub fn export_filename(format: ExportFormat, all: bool, at: DateTime<Utc>) -> String {
    let stem = if all { "all-chats-export" } else { "chat-export" };
    format!("{stem}-{}.{}", at.format("%Y-%m-%d"), format.extension())
}

// ── Writing ──────────────────────────────────────────────────────────────

/// Write `bytes` to `dir/name` atomically (temp file + rename).
///
/// A crash mid-write leaves at most a stray `.tmp` file, never a truncated
/// artifact under the final name.
pub async fn write_artifact(
    dir: &Path,
    name: &str,
    bytes: &[u8],
    mime_type: &str,
) -> Result<Artifact, ExportError> {
    let path = dir.join(name);
    let write_err = |source| ExportError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

    let tmp_path = dir.join(format!(".{name}.tmp"));
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, &path).await.map_err(write_err)?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(Artifact {
        path,
        mime_type: mime_type.to_string(),
        bytes: bytes.len() as u64,
    })
}

/// Bundle every successfully rasterised page into one ZIP archive.
///
/// Failed pages are skipped. PNG data is already compressed, so entries are
/// stored as-is.
pub fn build_zip(pages: &[PageImage]) -> Result<Vec<u8>, ExportError> {
    let zip_err = |e: zip::result::ZipError| ExportError::Internal(format!("ZIP packaging failed: {e}"));

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);

    let mut entries = 0usize;
    for page in pages.iter().filter(|p| p.is_ok()) {
        zip.start_file(zip_entry_name(page.page_num), options)
            .map_err(zip_err)?;
        zip.write_all(&page.png)
            .map_err(|e| ExportError::Internal(format!("ZIP packaging failed: {e}")))?;
        entries += 1;
    }

    let bytes = zip.finish().map_err(zip_err)?.into_inner();
    info!("Packed {} pages into {} byte archive", entries, bytes.len());
    Ok(bytes)
}

// ── Clipboard ────────────────────────────────────────────────────────────

/// The platform offers no image clipboard (or refused this image).
#[derive(Debug, Error)]
#[error("image clipboard unavailable: {0}")]
pub struct ClipboardUnavailable(pub String);

/// Copies PNG images to the system clipboard.
#[async_trait]
pub trait ImageClipboard: Send + Sync {
    async fn copy_png(&self, png: &[u8]) -> Result<(), ClipboardUnavailable>;
}

/// A platform without an image clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

#[async_trait]
impl ImageClipboard for NoClipboard {
    async fn copy_png(&self, _png: &[u8]) -> Result<(), ClipboardUnavailable> {
        Err(ClipboardUnavailable("no clipboard backend".into()))
    }
}

/// Pipes the image into a clipboard helper (`wl-copy`, `xclip`).
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Pick a helper from the session environment, if any.
    pub fn detect() -> Option<Self> {
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            return Some(Self::new("wl-copy", vec!["--type".into(), PNG_MIME.into()]));
        }
        if std::env::var_os("DISPLAY").is_some() {
            return Some(Self::new(
                "xclip",
                vec![
                    "-selection".into(),
                    "clipboard".into(),
                    "-t".into(),
                    PNG_MIME.into(),
                ],
            ));
        }
        None
    }
}

#[async_trait]
impl ImageClipboard for CommandClipboard {
    async fn copy_png(&self, png: &[u8]) -> Result<(), ClipboardUnavailable> {
        let unavailable = |e: std::io::Error| ClipboardUnavailable(format!("{}: {e}", self.program));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(unavailable)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png).await.map_err(unavailable)?;
        }
        let status = child.wait().await.map_err(unavailable)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardUnavailable(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Result of a clipboard copy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// No clipboard: the image was written as a download instead.
    FellBackToDownload(Artifact),
}

/// Copy a page image, falling back to a file download with a notice.
pub async fn copy_or_download(
    clipboard: &dyn ImageClipboard,
    png: &[u8],
    filename: &str,
    config: &ExportConfig,
) -> Result<CopyOutcome, ExportError> {
    match clipboard.copy_png(png).await {
        Ok(()) => {
            info!("Copied {} byte image to clipboard", png.len());
            config.notify(NoticeLevel::Success, "Image copied to clipboard");
            Ok(CopyOutcome::Copied)
        }
        Err(e) => {
            info!("Clipboard copy fell back to download: {}", e);
            let artifact = write_artifact(&config.output_dir, filename, png, PNG_MIME).await?;
            config.notify(NoticeLevel::Info, config.locale.labels().clipboard_fallback);
            Ok(CopyOutcome::FellBackToDownload(artifact))
        }
    }
}

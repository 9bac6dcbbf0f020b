//! Export entry points: one request in, written artifacts out.
//!
//! Three operations are supported, mirroring what a chat page offers:
//!
//! | Request                 | Output                                         |
//! |-------------------------|------------------------------------------------|
//! | `ExportFile`            | one JSON or Markdown file for the open chat    |
//! | `ExportAll`             | one JSON or Markdown file for every chat       |
//! | `RenderForSharing`      | PNG page images, a ZIP of them, or a clipboard |
//!
//! Failures abort only the current request. Every error is also reported
//! through the configured [`crate::progress::Notifier`] so a UI can show it
//! without inspecting the `Result`.

use crate::config::{ExportConfig, ExportFormat};
use crate::error::{ExportError, PageError};
use crate::extract::{ExtractorRegistry, PageSnapshot};
use crate::model::{Conversation, ServiceId};
use crate::output::{Artifact, ExportOutput, ExportStats, PageImage};
use crate::pipeline::compose::compose_page;
use crate::pipeline::package::{
    archive_filename, build_zip, copy_or_download, export_filename, image_filename,
    page_html_name, write_artifact, CopyOutcome, ImageClipboard, NoClipboard, PNG_MIME, ZIP_MIME,
};
use crate::pipeline::paginate::paginate;
use crate::pipeline::rasterize::Rasterizer;
use crate::pipeline::transcript::render_transcript;
use crate::progress::NoticeLevel;
use crate::stream::{render_all, render_page};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportRequest {
    /// Save the open conversation as a file.
    ExportFile {
        service: ServiceId,
        format: ExportFormat,
    },
    /// Save every reachable conversation as one file.
    ExportAll {
        service: ServiceId,
        format: ExportFormat,
    },
    /// Render the open conversation into shareable images.
    RenderForSharing {
        service: ServiceId,
        delivery: ShareDelivery,
    },
}

impl ExportRequest {
    pub fn service(&self) -> ServiceId {
        match self {
            ExportRequest::ExportFile { service, .. }
            | ExportRequest::ExportAll { service, .. }
            | ExportRequest::RenderForSharing { service, .. } => *service,
        }
    }
}

/// How rendered pages reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareDelivery {
    /// One PNG file per page.
    #[default]
    Images,
    /// Every page in a single ZIP archive.
    Zip,
    /// One page only. With `copy`, try the clipboard before downloading.
    Page { page: usize, copy: bool },
    /// The composed HTML documents, linked to each other, without rasterising.
    Documents,
}

/// Runs export requests against a set of extractors and a rasteriser.
#[derive(Clone)]
pub struct Exporter {
    extractors: ExtractorRegistry,
    rasterizer: Arc<dyn Rasterizer>,
    clipboard: Arc<dyn ImageClipboard>,
}

impl Exporter {
    /// Built-in extractors, no clipboard.
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            extractors: ExtractorRegistry::with_defaults(),
            rasterizer,
            clipboard: Arc::new(NoClipboard),
        }
    }

    pub fn extractors(mut self, registry: ExtractorRegistry) -> Self {
        self.extractors = registry;
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn ImageClipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Run one request and report the outcome through the notifier.
    pub async fn run(
        &self,
        request: &ExportRequest,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<ExportOutput, ExportError> {
        info!("Export request: {:?}", request);
        let labels = config.locale.labels();
        let result = match *request {
            ExportRequest::ExportFile { service, format } => {
                self.export_file(service, format, snapshot, config).await
            }
            ExportRequest::ExportAll { service, format } => {
                self.export_all(service, format, snapshot, config).await
            }
            ExportRequest::RenderForSharing { service, delivery } => {
                self.render_for_sharing(service, delivery, snapshot, config)
                    .await
            }
        };

        let is_render = matches!(request, ExportRequest::RenderForSharing { .. });
        match &result {
            Ok(_) => {
                let msg = if is_render {
                    labels.image_success
                } else {
                    labels.export_success
                };
                config.notify(NoticeLevel::Success, msg);
            }
            Err(ExportError::ExtractionEmpty { .. }) => {
                config.notify(NoticeLevel::Info, labels.no_messages);
            }
            Err(e) => {
                let prefix = if is_render {
                    labels.image_failed
                } else {
                    labels.export_failed
                };
                config.notify(NoticeLevel::Error, &format!("{prefix}: {}", e.cause()));
            }
        }
        result
    }

    /// Write the open conversation as JSON or Markdown.
    pub async fn export_file(
        &self,
        service: ServiceId,
        format: ExportFormat,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<ExportOutput, ExportError> {
        let start = Instant::now();
        let convo = self.extractors.extract(service, snapshot, config).await?;
        let artifact = write_transcript(std::slice::from_ref(&convo), false, format, config).await?;
        Ok(file_output(&[convo], artifact, start))
    }

    /// Write every reachable conversation as one JSON or Markdown file.
    pub async fn export_all(
        &self,
        service: ServiceId,
        format: ExportFormat,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<ExportOutput, ExportError> {
        let start = Instant::now();
        let all = self.extractors.extract_all(service, snapshot, config).await?;
        let artifact = write_transcript(&all, true, format, config).await?;
        Ok(file_output(&all, artifact, start))
    }

    /// Extract the open conversation and render it into images.
    pub async fn render_for_sharing(
        &self,
        service: ServiceId,
        delivery: ShareDelivery,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<ExportOutput, ExportError> {
        let convo = self.extractors.extract(service, snapshot, config).await?;
        self.share_conversation(&convo, delivery, config).await
    }

    /// Render an already-extracted conversation.
    pub async fn share_conversation(
        &self,
        conversation: &Conversation,
        delivery: ShareDelivery,
        config: &ExportConfig,
    ) -> Result<ExportOutput, ExportError> {
        share(
            conversation,
            self.rasterizer.as_ref(),
            self.clipboard.as_ref(),
            delivery,
            config,
        )
        .await
    }
}

// ── File exports ─────────────────────────────────────────────────────────

async fn write_transcript(
    conversations: &[Conversation],
    all: bool,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Artifact, ExportError> {
    let body = render_transcript(conversations, all, format, config)?;
    let name = export_filename(format, all, config.now());
    let artifact = write_artifact(&config.output_dir, &name, body.as_bytes(), format.mime_type()).await?;
    info!("Exported {} conversation(s) to {}", conversations.len(), artifact.path.display());
    Ok(artifact)
}

fn file_output(conversations: &[Conversation], artifact: Artifact, start: Instant) -> ExportOutput {
    ExportOutput {
        pages: Vec::new(),
        artifacts: vec![artifact],
        stats: ExportStats {
            conversations: conversations.len(),
            messages: conversations.iter().map(|c| c.messages.len()).sum(),
            total_duration_ms: start.elapsed().as_millis() as u64,
            ..Default::default()
        },
    }
}

// ── Render for sharing ───────────────────────────────────────────────────

/// Render `conversation` and deliver the pages.
///
/// # Errors
/// - [`ExportError::ExtractionEmpty`] if there is nothing to render
/// - [`ExportError::AllPagesFailed`] if no page of a batch rasterised
/// - [`ExportError::RenderFailure`] / [`ExportError::RasterizationFailure`]
///   if the single requested page failed
pub async fn share(
    conversation: &Conversation,
    rasterizer: &dyn Rasterizer,
    clipboard: &dyn ImageClipboard,
    delivery: ShareDelivery,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let total_start = Instant::now();
    if conversation.is_empty() {
        return Err(ExportError::ExtractionEmpty {
            service: conversation.service,
        });
    }
    let now = config.now();

    // ── Step 1: Pick pages ───────────────────────────────────────────────
    let render_start = Instant::now();
    let pages: Vec<PageImage> = match delivery {
        ShareDelivery::Documents => {
            return write_documents(conversation, config, total_start).await;
        }
        ShareDelivery::Page { page, .. } => {
            let all = paginate(&conversation.messages, config);
            let total = all.len();
            let Some(selected) = all.into_iter().find(|p| p.index == page) else {
                return Err(ExportError::InvalidConfig(format!(
                    "page {page} is out of range (1-{total})"
                )));
            };
            vec![render_page(conversation, selected, rasterizer, config).await]
        }
        ShareDelivery::Images | ShareDelivery::Zip => {
            render_all(conversation, rasterizer, config).await
        }
    };
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 2: Check for failures ───────────────────────────────────────
    let ok = pages.iter().filter(|p| p.is_ok()).count();
    if ok == 0 {
        let first = pages.iter().find_map(|p| p.error.clone());
        return Err(match (delivery, first) {
            (ShareDelivery::Page { .. }, Some(PageError::RenderFailed { page, detail })) => {
                ExportError::RenderFailure { page, detail }
            }
            (ShareDelivery::Page { .. }, Some(PageError::RasterizeFailed { page, detail })) => {
                ExportError::RasterizationFailure { page, detail }
            }
            (_, first) => ExportError::AllPagesFailed {
                total: pages.len(),
                first_error: first
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
        });
    }
    if ok < pages.len() {
        warn!("{} of {} pages failed to render", pages.len() - ok, pages.len());
    }

    // ── Step 3: Deliver ──────────────────────────────────────────────────
    let service = Some(conversation.service);
    let mut artifacts = Vec::new();
    match delivery {
        ShareDelivery::Zip => {
            let zip_pages = pages.clone();
            let bytes = tokio::task::spawn_blocking(move || build_zip(&zip_pages))
                .await
                .map_err(|e| ExportError::Internal(format!("ZIP task failed: {e}")))??;
            artifacts.push(write_artifact(&config.output_dir, &archive_filename(now), &bytes, ZIP_MIME).await?);
        }
        ShareDelivery::Page { copy, .. } => {
            // `ok == 1` here, the single page succeeded.
            let p = &pages[0];
            let name = image_filename(service, now, p.page_num, p.total_pages);
            if copy {
                match copy_or_download(clipboard, &p.png, &name, config).await? {
                    CopyOutcome::Copied => {}
                    CopyOutcome::FellBackToDownload(a) => artifacts.push(a),
                }
            } else {
                artifacts.push(write_artifact(&config.output_dir, &name, &p.png, PNG_MIME).await?);
            }
        }
        ShareDelivery::Images | ShareDelivery::Documents => {
            for p in pages.iter().filter(|p| p.is_ok()) {
                let name = image_filename(service, now, p.page_num, p.total_pages);
                artifacts.push(write_artifact(&config.output_dir, &name, &p.png, PNG_MIME).await?);
            }
        }
    }

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let stats = ExportStats {
        conversations: 1,
        messages: conversation.messages.len(),
        total_pages: pages.first().map(|p| p.total_pages).unwrap_or(0),
        rendered_pages: ok,
        failed_pages: pages.len() - ok,
        png_bytes: pages.iter().map(|p| p.png.len() as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
    };
    info!(
        "Rendered {}/{} pages, {} artifact(s), {}ms total",
        stats.rendered_pages,
        pages.len(),
        artifacts.len(),
        stats.total_duration_ms
    );

    Ok(ExportOutput {
        pages,
        artifacts,
        stats,
    })
}

/// Write every page's composed document as `chat_page_<k>.html`.
async fn write_documents(
    conversation: &Conversation,
    config: &ExportConfig,
    total_start: Instant,
) -> Result<ExportOutput, ExportError> {
    let pages = paginate(&conversation.messages, config);
    let mut artifacts = Vec::with_capacity(pages.len());
    for page in &pages {
        let doc = compose_page(conversation, *page, config)?;
        let name = page_html_name(doc.index);
        artifacts.push(write_artifact(&config.output_dir, &name, doc.html.as_bytes(), "text/html").await?);
        debug!("Wrote document {}/{}", doc.index, doc.total);
    }
    Ok(ExportOutput {
        pages: Vec::new(),
        artifacts,
        stats: ExportStats {
            conversations: 1,
            messages: conversation.messages.len(),
            total_pages: pages.len(),
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            ..Default::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use crate::error::RasterError;
    use crate::model::Message;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use image::{DynamicImage, RgbaImage};

    struct Solid;

    #[async_trait]
    impl Rasterizer for Solid {
        async fn rasterize(&self, _html: &str, width: u32) -> Result<DynamicImage, RasterError> {
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(width, 20)))
        }
    }

    struct Broken;

    #[async_trait]
    impl Rasterizer for Broken {
        async fn rasterize(&self, _html: &str, _width: u32) -> Result<DynamicImage, RasterError> {
            Err(RasterError::Task("no display".into()))
        }
    }

    fn cfg(dir: &std::path::Path) -> ExportConfig {
        ExportConfig::builder()
            .output_dir(dir)
            .page_budget(100)
            .clock(Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
            )))
            .build()
            .unwrap()
    }

    fn convo() -> Conversation {
        Conversation::new(
            ServiceId::Gemini,
            "Two pages",
            "2026-10-18T12:00:00Z",
            vec![Message::user("q".repeat(80)), Message::assistant("a".repeat(80))],
        )
    }

    #[tokio::test]
    async fn images_are_written_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let out = share(&convo(), &Solid, &NoClipboard, ShareDelivery::Images, &cfg(dir.path()))
            .await
            .unwrap();
        assert_eq!(out.stats.total_pages, 2);
        let names: Vec<String> = out
            .artifacts
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["gemini_20261018120000_p1of2.png", "gemini_20261018120000_p2of2.png"]
        );
    }

    #[tokio::test]
    async fn single_page_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let err = share(
            &convo(),
            &Solid,
            &NoClipboard,
            ShareDelivery::Page { page: 3, copy: false },
            &cfg(dir.path()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn single_page_failure_is_rasterization_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = share(
            &convo(),
            &Broken,
            &NoClipboard,
            ShareDelivery::Page { page: 2, copy: false },
            &cfg(dir.path()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExportError::RasterizationFailure { page: 2, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn batch_failure_is_all_pages_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = share(&convo(), &Broken, &NoClipboard, ShareDelivery::Zip, &cfg(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::AllPagesFailed { total: 2, .. }));
    }

    #[tokio::test]
    async fn documents_link_to_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let out = share(&convo(), &Broken, &NoClipboard, ShareDelivery::Documents, &cfg(dir.path()))
            .await
            .unwrap();
        assert_eq!(out.artifacts.len(), 2);
        let first = std::fs::read_to_string(dir.path().join("chat_page_1.html")).unwrap();
        assert!(first.contains("chat_page_2.html"));
    }

    #[tokio::test]
    async fn empty_conversation_is_extraction_empty() {
        let dir = tempfile::tempdir().unwrap();
        let empty = Conversation::new(ServiceId::Claude, "", "", vec![]);
        let err = share(&empty, &Solid, &NoClipboard, ShareDelivery::Images, &cfg(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ExtractionEmpty { .. }));
    }
}

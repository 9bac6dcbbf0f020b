//! Output types produced by the export pipeline.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One complete, standalone HTML document for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// 1-based page number.
    pub index: usize,
    pub total: usize,
    pub html: String,
}

/// Raster result for one page of a render batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page_num: usize,

    pub total_pages: usize,

    /// Encoded PNG bytes. Empty when `error` is set.
    #[serde(skip)]
    pub png: Vec<u8>,

    pub width: u32,
    pub height: u32,

    /// Wall-clock time spent composing and rasterising this page.
    pub duration_ms: u64,

    /// Set if this page failed; `png` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
}

impl PageImage {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub(crate) fn failed(page_num: usize, total_pages: usize, error: PageError) -> Self {
        Self {
            page_num,
            total_pages,
            png: Vec::new(),
            width: 0,
            height: 0,
            duration_ms: 0,
            error: Some(error),
        }
    }
}

/// A file written by an export operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub mime_type: String,
    pub bytes: u64,
}

/// Aggregate statistics for one export operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportStats {
    /// Conversations written (export-all may write many).
    pub conversations: usize,
    pub messages: usize,
    pub total_pages: usize,
    pub rendered_pages: usize,
    pub failed_pages: usize,
    pub png_bytes: u64,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
}

/// Everything an export operation produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportOutput {
    /// Per-page raster results. Empty for file exports.
    pub pages: Vec<PageImage>,

    /// Files written to the output directory, in write order.
    pub artifacts: Vec<Artifact>,

    pub stats: ExportStats,
}

impl ExportOutput {
    /// Successfully rasterised pages, in page order.
    pub fn ok_pages(&self) -> impl Iterator<Item = &PageImage> {
        self.pages.iter().filter(|p| p.is_ok())
    }
}

//! Error types for the chatshot library.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`ExportError`] — **Fatal**: the export operation cannot proceed
//!   (nothing extracted, extractor failed, document composition failed).
//!   Returned as `Err(ExportError)` from the top-level `export*` functions.
//!   It aborts the current operation only; the host is never brought down.
//!
//! * [`PageError`] — **Non-fatal**: one page of a multi-page batch failed to
//!   rasterise but the remaining pages are fine. Stored inside
//!   [`crate::output::PageImage`] so callers can inspect partial success.
//!
//! * [`SanitizeError`] — **Local**: fragment protection failed on malformed
//!   markup. Never leaves [`crate::pipeline::sanitize`]; the sanitizer falls
//!   back to the untouched input.
//!
//! An unavailable image clipboard is not an error at all, see
//! [`crate::pipeline::package::CopyOutcome`].

use crate::model::ServiceId;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the chatshot library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// The extractor ran but found no conversation on the current page.
    #[error("No chat messages found for {service}.\nMake sure the page contains a conversation.")]
    ExtractionEmpty { service: ServiceId },

    /// The extractor itself failed (storage query, unreadable snapshot).
    #[error("Failed to extract chat data from {service}: {detail}")]
    ExtractionFailure { service: ServiceId, detail: String },

    /// No extractor is registered for the requested service.
    #[error("Unsupported chat service '{0}'")]
    UnsupportedService(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Snapshot file was not found at the given path.
    #[error("Page snapshot not found: '{path}'")]
    SnapshotNotFound { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// Markup conversion or document composition failed.
    #[error("Failed to render page {page}: {detail}")]
    RenderFailure { page: usize, detail: String },

    /// Image generation failed. The user may retry.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterizationFailure { page: usize, detail: String },

    /// Every page of a batch failed to rasterise.
    #[error("All {total} pages failed to rasterise.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// The settings / template store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Short human-readable cause for user-facing notices.
    ///
    /// Only the first line of the message is kept; the remaining lines are
    /// hints meant for the terminal.
    pub fn cause(&self) -> String {
        self.to_string()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Whether a manual retry of the same request can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExportError::RasterizationFailure { .. }
                | ExportError::AllPagesFailed { .. }
                | ExportError::DownloadFailed { .. }
        )
    }
}

/// A non-fatal error for a single page of a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Document composition failed for this page.
    #[error("Page {page}: render failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Rasterisation failed for this page.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RasterizeFailed { page: usize, detail: String },
}

/// Failure inside a [`crate::pipeline::rasterize::Rasterizer`].
///
/// The render batch records it on the page as [`PageError::RasterizeFailed`].
#[derive(Debug, Error)]
pub enum RasterError {
    /// The external renderer could not be started.
    #[error("could not launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external renderer ran but reported failure.
    #[error("'{program}' exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },

    /// The external renderer did not finish in time.
    #[error("'{program}' timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    /// The capture has no pixels.
    #[error("capture is empty ({width}x{height})")]
    EmptyCapture { width: u32, height: u32 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rasteriser task failed: {0}")]
    Task(String),
}

/// Fragment protection failure. Recovered locally, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// An opening tag has no matching closing tag.
    #[error("unterminated <{tag}> fragment at byte {offset}")]
    Unterminated { tag: &'static str, offset: usize },

    /// A fragment contains another fragment of the same kind.
    #[error("nested <{tag}> fragment at byte {offset}")]
    Nested { tag: &'static str, offset: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_empty_display() {
        let e = ExportError::ExtractionEmpty {
            service: ServiceId::DeepSeek,
        };
        assert!(e.to_string().contains("deepseek"), "got: {e}");
    }

    #[test]
    fn cause_keeps_first_line_only() {
        let e = ExportError::AllPagesFailed {
            total: 3,
            first_error: "boom".into(),
        };
        assert_eq!(e.cause(), "All 3 pages failed to rasterise.");
    }

    #[test]
    fn rasterization_is_retryable() {
        let e = ExportError::RasterizationFailure {
            page: 2,
            detail: "exit status 1".into(),
        };
        assert!(e.is_retryable());
        assert!(e.to_string().contains("page 2"));
        assert!(!ExportError::InvalidConfig("x".into()).is_retryable());
    }

    #[test]
    fn sanitize_error_display() {
        let e = SanitizeError::Nested {
            tag: "svg",
            offset: 12,
        };
        assert_eq!(e.to_string(), "nested <svg> fragment at byte 12");
    }
}

//! # chatshot
//!
//! Export AI chat conversations (ChatGPT, Claude, Gemini, DeepSeek, Yuanbao)
//! to JSON, Markdown, or paginated PNG images ready for sharing.
//!
//! ## Why images?
//!
//! A long conversation does not fit in one screenshot, and a single very
//! tall image is unreadable on a phone. This crate splits the conversation
//! into pages by estimated rendered length, composes each page as a styled
//! standalone document, and rasterises it at a fixed width with the full
//! content height.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page snapshot / on-device dump
//!  │
//!  ├─ 1. Extract   per-service extractor → Conversation
//!  ├─ 2. Markup    sanitize + Markdown → HTML + presentation rules
//!  ├─ 3. Paginate  estimated-length budget per page
//!  ├─ 4. Compose   one standalone HTML document per page
//!  ├─ 5. Raster    external renderer (wkhtmltoimage) → bitmap
//!  ├─ 6. Encode    themed canvas, PNG (spawn_blocking)
//!  └─ 7. Package   PNG files, ZIP archive, or clipboard
//! ```
//!
//! File exports skip steps 2–7 and write a JSON or Markdown transcript.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatshot::{ExportConfig, ExportRequest, Exporter, ShareDelivery, Theme};
//! use chatshot::extract::snapshot::load_snapshot;
//! use chatshot::model::ServiceId;
//! use chatshot::pipeline::rasterize::CommandRasterizer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshot = load_snapshot("saved-chat.html", 30).await?;
//!     let config = ExportConfig::builder().theme(Theme::Dark).build()?;
//!     let exporter = Exporter::new(Arc::new(CommandRasterizer::wkhtmltoimage()));
//!     let request = ExportRequest::RenderForSharing {
//!         service: ServiceId::ChatGpt,
//!         delivery: ShareDelivery::Zip,
//!     };
//!     let output = exporter.run(&request, &snapshot, &config).await?;
//!     eprintln!("{} pages rendered", output.stats.rendered_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `chatshot` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! chatshot = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod i18n;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod storage;
pub mod stream;
pub mod theme;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Clock, ExportConfig, ExportConfigBuilder, ExportFormat, FixedClock, SystemClock};
pub use error::{ExportError, PageError, RasterError, SanitizeError};
pub use export::{share, ExportRequest, Exporter, ShareDelivery};
pub use extract::{Extractor, ExtractorRegistry, PageSnapshot};
pub use i18n::Locale;
pub use model::{Conversation, Message, Role, ServiceId};
pub use output::{Artifact, ExportOutput, ExportStats, PageImage, RenderedDocument};
pub use progress::{ExportProgressCallback, NoopProgressCallback, NoticeLevel, Notifier, ProgressCallback};
pub use stream::{render_all, render_stream, PageStream};
pub use theme::Theme;

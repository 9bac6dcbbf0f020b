//! Streaming render API: emit page images as they complete.
//!
//! Long conversations produce many pages and each one waits on an external
//! renderer. A stream lets callers drive a progress bar, write pages to disk
//! one by one, or stop early by dropping the stream.
//!
//! Pages are always produced **sequentially and in order**. The renderer
//! behind a [`Rasterizer`] is treated as a single exclusive surface; page
//! `k+1` is not composed until page `k` has been captured and encoded.
//! Dropping the stream mid-batch abandons the page in flight; nothing else
//! needs cleaning up.

use crate::config::ExportConfig;
use crate::error::{PageError, RasterError};
use crate::model::{Conversation, Page};
use crate::output::PageImage;
use crate::pipeline::compose::compose_page;
use crate::pipeline::encode::{compose_canvas, encode_png};
use crate::pipeline::paginate::paginate;
use crate::pipeline::rasterize::Rasterizer;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of page images borrowing the conversation it renders.
///
/// Failed pages are yielded too, with [`PageImage::error`] set.
pub type PageStream<'a> = Pin<Box<dyn Stream<Item = PageImage> + Send + 'a>>;

/// Paginate a conversation and render its pages one after another.
///
/// Fires `on_page_start` / `on_page_complete` / `on_page_error` per page but
/// not the batch-level events; [`render_all`] adds those.
pub fn render_stream<'a>(
    conversation: &'a Conversation,
    rasterizer: &'a dyn Rasterizer,
    config: &'a ExportConfig,
) -> PageStream<'a> {
    let pages = paginate(&conversation.messages, config);
    info!(
        "Rendering {} messages as {} page(s)",
        conversation.messages.len(),
        pages.len()
    );
    let s = stream::iter(pages)
        .then(move |page| async move { render_page(conversation, page, rasterizer, config).await });
    Box::pin(s)
}

/// Render every page and collect the results in page order.
pub async fn render_all(
    conversation: &Conversation,
    rasterizer: &dyn Rasterizer,
    config: &ExportConfig,
) -> Vec<PageImage> {
    let total = paginate(&conversation.messages, config).len();
    if let Some(cb) = &config.progress_callback {
        cb.on_render_start(total);
    }

    let pages: Vec<PageImage> = render_stream(conversation, rasterizer, config)
        .collect()
        .await;

    if let Some(cb) = &config.progress_callback {
        cb.on_render_complete(total, pages.iter().filter(|p| p.is_ok()).count());
    }
    pages
}

/// Compose, rasterise and encode one page.
///
/// Never fails: errors are recorded on the returned [`PageImage`].
pub async fn render_page(
    conversation: &Conversation,
    page: Page<'_>,
    rasterizer: &dyn Rasterizer,
    config: &ExportConfig,
) -> PageImage {
    let (n, total) = (page.index, page.total);
    if let Some(cb) = &config.progress_callback {
        cb.on_page_start(n, total);
    }
    let start = Instant::now();

    let fail = |err: PageError| {
        warn!("{}", err);
        if let Some(cb) = &config.progress_callback {
            cb.on_page_error(n, total, &err.to_string());
        }
        PageImage::failed(n, total, err)
    };

    // ── Compose ──────────────────────────────────────────────────────────
    let doc = match compose_page(conversation, page, config) {
        Ok(d) => d,
        Err(e) => {
            return fail(PageError::RenderFailed {
                page: n,
                detail: e.to_string(),
            })
        }
    };

    // ── Capture ──────────────────────────────────────────────────────────
    let width = config.target_width;
    let capture = match rasterizer.rasterize(&doc.html, width).await {
        Ok(img) => img,
        Err(e) => {
            return fail(PageError::RasterizeFailed {
                page: n,
                detail: e.to_string(),
            })
        }
    };

    // ── Canvas + PNG (CPU-bound) ─────────────────────────────────────────
    let theme = config.theme;
    let encoded = tokio::task::spawn_blocking(move || {
        let canvas = compose_canvas(&capture, width, theme)?;
        let png = encode_png(&canvas)?;
        Ok::<_, RasterError>((png, canvas.width(), canvas.height()))
    })
    .await
    .map_err(|e| RasterError::Task(e.to_string()))
    .and_then(|r| r);

    let (png, w, h) = match encoded {
        Ok(v) => v,
        Err(e) => {
            return fail(PageError::RasterizeFailed {
                page: n,
                detail: e.to_string(),
            })
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    info!("Page {}/{} → {}x{} px, {} bytes in {}ms", n, total, w, h, png.len(), duration_ms);
    if let Some(cb) = &config.progress_callback {
        cb.on_page_complete(n, total, png.len());
    }

    PageImage {
        page_num: n,
        total_pages: total,
        png,
        width: w,
        height: h,
        duration_ms,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, ServiceId};
    use crate::progress::ExportProgressCallback;
    use async_trait::async_trait;
    use image::{DynamicImage, RgbaImage};
    use std::sync::{Arc, Mutex};

    /// Height grows with the document so pages are distinguishable.
    struct Fake {
        fail_on: Option<usize>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Rasterizer for Fake {
        async fn rasterize(&self, html: &str, width: u32) -> Result<DynamicImage, RasterError> {
            let call = {
                let mut c = self.calls.lock().unwrap();
                *c += 1;
                *c
            };
            if self.fail_on == Some(call) {
                return Err(RasterError::Task("renderer crashed".into()));
            }
            let h = 10 + (html.len() as u32 % 50);
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(width, h)))
        }
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl ExportProgressCallback for Events {
        fn on_render_start(&self, total: usize) {
            self.0.lock().unwrap().push(format!("start {total}"));
        }
        fn on_page_start(&self, n: usize, _: usize) {
            self.0.lock().unwrap().push(format!("page {n}"));
        }
        fn on_page_complete(&self, n: usize, _: usize, _: usize) {
            self.0.lock().unwrap().push(format!("ok {n}"));
        }
        fn on_page_error(&self, n: usize, _: usize, _: &str) {
            self.0.lock().unwrap().push(format!("err {n}"));
        }
        fn on_render_complete(&self, total: usize, ok: usize) {
            self.0.lock().unwrap().push(format!("done {ok}/{total}"));
        }
    }

    fn convo() -> Conversation {
        Conversation::new(
            ServiceId::Claude,
            "Pages",
            "2026-10-18T00:00:00Z",
            vec![
                Message::user("a".repeat(900)),
                Message::assistant("b".repeat(900)),
                Message::user("c".repeat(900)),
            ],
        )
    }

    #[tokio::test]
    async fn pages_render_in_order_with_events() {
        let events = Arc::new(Events::default());
        let cfg = ExportConfig::builder()
            .progress_callback(events.clone())
            .target_width(400)
            .build()
            .unwrap();
        let fake = Fake {
            fail_on: None,
            calls: Mutex::new(0),
        };
        let pages = render_all(&convo(), &fake, &cfg).await;

        assert_eq!(pages.iter().map(|p| p.page_num).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(pages.iter().all(|p| p.is_ok() && p.width == 400));
        assert!(pages[0].png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(
            *events.0.lock().unwrap(),
            vec!["start 3", "page 1", "ok 1", "page 2", "ok 2", "page 3", "ok 3", "done 3/3"]
        );
    }

    #[tokio::test]
    async fn a_failing_page_does_not_stop_the_batch() {
        let events = Arc::new(Events::default());
        let cfg = ExportConfig::builder()
            .progress_callback(events.clone())
            .build()
            .unwrap();
        let fake = Fake {
            fail_on: Some(2),
            calls: Mutex::new(0),
        };
        let pages = render_all(&convo(), &fake, &cfg).await;

        assert!(pages[0].is_ok());
        assert!(matches!(
            pages[1].error,
            Some(PageError::RasterizeFailed { page: 2, .. })
        ));
        assert!(pages[2].is_ok());
        assert!(events.0.lock().unwrap().contains(&"err 2".to_string()));
        assert_eq!(events.0.lock().unwrap().last().unwrap(), "done 2/3");
    }

    #[tokio::test]
    async fn empty_capture_is_a_page_error() {
        struct Blank;

        #[async_trait]
        impl Rasterizer for Blank {
            async fn rasterize(&self, _: &str, _: u32) -> Result<DynamicImage, RasterError> {
                Ok(DynamicImage::ImageRgba8(RgbaImage::new(0, 0)))
            }
        }

        let c = convo();
        let cfg = ExportConfig::default();
        let page = paginate(&c.messages, &cfg)[0];
        let img = render_page(&c, page, &Blank, &cfg).await;
        assert!(!img.is_ok());
    }
}

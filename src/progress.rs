//! Progress and notice callbacks for the export pipeline.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! events while the render batch composes and rasterises each page, and an
//! [`Arc<dyn Notifier>`] via [`crate::config::ExportConfigBuilder::notifier`]
//! to receive the user-visible notices (toasts in a browser, stderr lines in
//! the CLI).
//!
//! Both traits are `Send + Sync` and every method has a no-op default, so
//! callers only override what they care about. A callback whose target UI has
//! gone away simply ignores the event; the pipeline never checks.
//!
//! # Example
//!
//! ```rust
//! use chatshot::{ExportProgressCallback, ExportConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ExportProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, png_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, png_len);
//!     }
//! }
//!
//! let config = ExportConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the render batch as it processes each page.
///
/// Pages are processed strictly one after another, so events for page `k+1`
/// never interleave with events for page `k`.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once before the first page is composed.
    fn on_render_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is composed and rasterised.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the batch
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page image is ready.
    ///
    /// # Arguments
    /// * `png_len` — byte length of the encoded PNG
    fn on_page_complete(&self, page_num: usize, total_pages: usize, png_len: usize) {
        let _ = (page_num, total_pages, png_len);
    }

    /// Called when a page fails to render or rasterise.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    fn on_render_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Receives short, human-readable notices meant for the end user.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Routes notices into the `tracing` log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{message}"),
            NoticeLevel::Warning => tracing::warn!("{message}"),
            NoticeLevel::Error => tracing::error!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records only failures; every other event falls through to the defaults.
    #[derive(Default)]
    struct FailedPages(Mutex<Vec<(usize, String)>>);

    impl ExportProgressCallback for FailedPages {
        fn on_page_error(&self, page_num: usize, _total_pages: usize, error: &str) {
            self.0.lock().unwrap().push((page_num, error.to_string()));
        }
    }

    #[derive(Default)]
    struct Transcript(Mutex<Vec<String>>);

    impl ExportProgressCallback for Transcript {
        fn on_render_start(&self, total_pages: usize) {
            self.0.lock().unwrap().push(format!("start {total_pages}"));
        }

        fn on_page_complete(&self, page_num: usize, total_pages: usize, png_len: usize) {
            self.0.lock().unwrap().push(format!("page {page_num}/{total_pages} {png_len}B"));
        }

        fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
            self.0.lock().unwrap().push(format!("page {page_num}/{total_pages} failed: {error}"));
        }

        fn on_render_complete(&self, total_pages: usize, success_count: usize) {
            self.0.lock().unwrap().push(format!("done {success_count}/{total_pages}"));
        }
    }

    /// The order a two-page batch with one rasterise failure reports in.
    fn two_page_batch(cb: &dyn ExportProgressCallback) {
        cb.on_render_start(2);
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 1024);
        cb.on_page_start(2, 2);
        cb.on_page_error(2, 2, "rasterise timed out");
        cb.on_render_complete(2, 1);
    }

    #[test]
    fn partial_override_sees_only_failures() {
        let failed = Arc::new(FailedPages::default());
        let as_dyn: ProgressCallback = failed.clone();
        two_page_batch(as_dyn.as_ref());
        assert_eq!(*failed.0.lock().unwrap(), vec![(2, "rasterise timed out".to_string())]);

        // Defaults are callable through the stored type too.
        let noop: ProgressCallback = Arc::new(NoopProgressCallback);
        two_page_batch(noop.as_ref());
    }

    #[test]
    fn batch_events_arrive_in_order() {
        let t = Transcript::default();
        two_page_batch(&t);
        assert_eq!(
            *t.0.lock().unwrap(),
            vec![
                "start 2",
                "page 1/2 1024B",
                "page 2/2 failed: rasterise timed out",
                "done 1/2",
            ]
        );
    }

    #[test]
    fn notifier_collects_messages() {
        #[derive(Default)]
        struct Collect(Mutex<Vec<(NoticeLevel, String)>>);
        impl Notifier for Collect {
            fn notify(&self, level: NoticeLevel, message: &str) {
                self.0.lock().unwrap().push((level, message.to_string()));
            }
        }

        let collect = Arc::new(Collect::default());
        let n: Arc<dyn Notifier> = collect.clone();
        n.notify(NoticeLevel::Info, "Exporting 3 pages");
        n.notify(NoticeLevel::Success, "Copied to clipboard");
        assert_eq!(
            *collect.0.lock().unwrap(),
            vec![
                (NoticeLevel::Info, "Exporting 3 pages".to_string()),
                (NoticeLevel::Success, "Copied to clipboard".to_string()),
            ]
        );
        TracingNotifier.notify(NoticeLevel::Warning, "logged only");
    }
}

//! Pipeline stages for turning a conversation into shareable output.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the rasterising backend can be swapped without
//! touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─ sanitize ─┐
//! messages ──┤  markup    ├──▶ paginate ──▶ compose ──▶ rasterize ──▶ encode ──▶ package
//!            └─ sanitize ─┘    (budget)     (HTML)      (bitmap)      (canvas,   (files, ZIP,
//!              protect/restore                                         PNG)       clipboard)
//! ```
//!
//! 1. [`sanitize`]  — swap embedded `<svg>` blocks for placeholders around
//!    the Markdown pass, then put them back
//! 2. [`markup`]    — Markdown → HTML plus presentation rules (code badges,
//!    themed inline styles)
//! 3. [`paginate`]  — split messages into pages by estimated length
//! 4. [`compose`]   — one standalone HTML document per page
//! 5. [`rasterize`] — document → full-height bitmap behind the
//!    [`rasterize::Rasterizer`] seam
//! 6. [`encode`]    — theme-coloured canvas and PNG encoding; CPU-bound,
//!    run in `spawn_blocking`
//! 7. [`package`]   — filenames, atomic writes, ZIP bundles, clipboard
//!
//! [`transcript`] sits beside this flow: it turns conversations straight into
//! JSON or Markdown files.

pub mod compose;
pub mod encode;
pub mod markup;
pub mod package;
pub mod paginate;
pub mod rasterize;
pub mod sanitize;
pub mod transcript;

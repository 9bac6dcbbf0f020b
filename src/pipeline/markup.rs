//! Markup rendering: one message field → styled, embeddable HTML.
//!
//! ## Stage order
//!
//! ```text
//! raw ─▶ protect ─▶ markdown ─▶ restore ─▶ strip active content ─▶ present
//!        (sanitize)  (pulldown)  (sanitize)  (scripts, on* handlers)  (inline styles)
//! ```
//!
//! Protect must precede conversion. Stripping runs after restore so it also
//! covers the protected fragments, which bypass the Markdown pass entirely.
//!
//! ## Presentation rules
//!
//! Each rule stamps theme colours as inline `style` attributes. Rasterisers
//! that drop `<style>` blocks still get a themed result. Rules run in this
//! order: code blocks before inline code so block `<code>` tags are already
//! classed when the inline rule looks for bare ones.

use crate::config::ExportConfig;
use crate::i18n::Labels;
use crate::model::Message;
use crate::pipeline::sanitize::{Sanitizer, RESPONSIVE_SVG_STYLE};
use crate::theme::Palette;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser};
use regex::{Captures, Regex};

/// A message's rendered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub content_html: String,
    pub thinking_html: Option<String>,
}

/// Renders message fields with one theme and locale.
#[derive(Debug, Clone, Copy)]
pub struct MarkupRenderer {
    palette: &'static Palette,
    labels: &'static Labels,
}

impl MarkupRenderer {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            palette: config.theme.palette(),
            labels: config.locale.labels(),
        }
    }

    /// Render the body and, if present, the thinking trace of one message.
    pub fn render_message(&self, message: &Message) -> RenderedMessage {
        RenderedMessage {
            content_html: self.render(&message.content, &Sanitizer::svg()),
            thinking_html: message
                .thinking()
                .map(|t| self.render(t, &Sanitizer::thinking_svg())),
        }
    }

    /// Run one field through the full stage order.
    pub fn render(&self, text: &str, sanitizer: &Sanitizer) -> String {
        let protected = sanitizer.protect(text);
        let html = markdown_to_html(&protected.text);
        let html = protected.restore(&html, Some(RESPONSIVE_SVG_STYLE));
        let html = strip_active_content(&html);
        self.present(&html)
    }

    /// Apply every presentation rule.
    pub fn present(&self, html: &str) -> String {
        let s = self.style_code_blocks(html);
        let s = self.style_inline_code(&s);
        let s = self.style_headings(&s);
        let s = self.style_emphasis(&s);
        let s = self.style_links(&s);
        let s = self.style_blockquotes(&s);
        self.style_lists(&s)
    }

    // ── Rule 1: Code blocks with language badge ──────────────────────────

    fn style_code_blocks(&self, html: &str) -> String {
        let p = self.palette;
        RE_CODE_BLOCK
            .replace_all(html, |caps: &Captures<'_>| {
                let lang = caps
                    .get(1)
                    .map(|m| m.as_str())
                    .filter(|l| !l.is_empty())
                    .unwrap_or(self.labels.code);
                let code = caps[2].trim_end_matches('\n');
                format!(
                    "<pre data-language=\"{lang}\" style=\"position:relative;background:{bg};color:{fg};\
                     padding:28px 16px 16px;border-radius:6px;overflow-x:auto;margin:16px 0;\
                     font-size:13px;line-height:1.5;white-space:pre-wrap;word-break:break-all;\">\
                     <span class=\"code-lang\" style=\"position:absolute;top:0;right:0;font-size:12px;\
                     padding:2px 8px;background:{badge};color:#ffffff;border-radius:0 6px 0 6px;\">{lang}</span>\
                     <code class=\"code-block\">{code}</code></pre>",
                    bg = p.code_bg,
                    fg = p.code_fg,
                    badge = p.code_badge,
                )
            })
            .into_owned()
    }

    // ── Rule 2: Inline code ──────────────────────────────────────────────

    fn style_inline_code(&self, html: &str) -> String {
        let p = self.palette;
        html.replace(
            "<code>",
            &format!(
                "<code style=\"background:{};color:{};padding:2px 4px;border-radius:4px;font-size:13px;\">",
                p.inline_code_bg, p.inline_code_fg
            ),
        )
    }

    // ── Rule 3: Headings ─────────────────────────────────────────────────

    fn style_headings(&self, html: &str) -> String {
        let color = self.palette.heading;
        RE_HEADING
            .replace_all(html, |caps: &Captures<'_>| {
                let level = &caps[1];
                let size = match level {
                    "1" => 20,
                    "2" => 18,
                    "3" => 16,
                    _ => 15,
                };
                format!(
                    "<h{level} style=\"color:{color};font-size:{size}px;font-weight:600;margin:16px 0 8px;\">"
                )
            })
            .into_owned()
    }

    // ── Rule 4: Bold and italic ──────────────────────────────────────────

    fn style_emphasis(&self, html: &str) -> String {
        html.replace(
            "<strong>",
            &format!("<strong style=\"color:{};font-weight:600;\">", self.palette.heading),
        )
        .replace("<em>", "<em style=\"font-style:italic;\">")
    }

    // ── Rule 5: Links ────────────────────────────────────────────────────

    fn style_links(&self, html: &str) -> String {
        html.replace(
            "<a href=",
            &format!(
                "<a style=\"color:{};text-decoration:none;\" target=\"_blank\" rel=\"noopener\" href=",
                self.palette.accent
            ),
        )
    }

    // ── Rule 6: Blockquotes ──────────────────────────────────────────────

    fn style_blockquotes(&self, html: &str) -> String {
        let p = self.palette;
        html.replace(
            "<blockquote>",
            &format!(
                "<blockquote style=\"border-left:4px solid {};background:{};color:{};padding:8px 16px;margin:16px 0;\">",
                p.accent, p.quote_bg, p.secondary
            ),
        )
    }

    // ── Rule 7: Lists ────────────────────────────────────────────────────

    fn style_lists(&self, html: &str) -> String {
        RE_LIST_OPEN
            .replace_all(html, "<$1$2 style=\"padding-left:24px;margin:12px 0;\">")
            .into_owned()
    }
}

static RE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<pre><code(?: class="language-([^"]*)")?>(.*?)</code></pre>"#).unwrap()
});

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h([1-6])>").unwrap());

static RE_LIST_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(ul|ol)((?: start=\x22\d+\x22)?)>").unwrap());

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap());

static RE_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<[a-zA-Z][^>]*>"#).unwrap());

static RE_EVENT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

/// CommonMark + GFM tables/strikethrough/task lists to HTML.
///
/// Raw HTML passes through. Soft breaks become `<br />` since chat text
/// treats a single newline as a line break.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Drop `<script>` elements and `on*=` handler attributes.
///
/// Handlers are only matched inside opening tags, so prose such as
/// `online=true` is left alone.
fn strip_active_content(html: &str) -> String {
    let html = RE_SCRIPT.replace_all(html, "");
    RE_OPEN_TAG
        .replace_all(&html, |caps: &Captures<'_>| {
            RE_EVENT_ATTR.replace_all(&caps[0], "").into_owned()
        })
        .into_owned()
}

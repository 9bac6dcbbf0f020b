//! Page composition: one page of messages → one standalone HTML document.
//!
//! Every document repeats the conversation chrome (title, service, date) so
//! each page stands on its own once rasterised. Page indicator and
//! previous/next links appear only in multi-page batches.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::i18n::Labels;
use crate::model::{Conversation, Message, Page};
use crate::output::RenderedDocument;
use crate::pipeline::markup::MarkupRenderer;
use crate::pipeline::package::page_html_name;
use crate::theme::Palette;
use std::fmt::Write;
use tracing::debug;

/// Compose one page into a complete document.
///
/// The only time-dependent field is the export date, which comes from
/// [`ExportConfig::now`]. With a fixed clock the output is byte-identical
/// across calls.
pub fn compose_page(
    conversation: &Conversation,
    page: Page<'_>,
    config: &ExportConfig,
) -> Result<RenderedDocument, ExportError> {
    let html = write_document(conversation, page, config).map_err(|e| ExportError::RenderFailure {
        page: page.index,
        detail: e.to_string(),
    })?;

    debug!(
        "Composed page {}/{} ({} messages, {} bytes)",
        page.index,
        page.total,
        page.messages.len(),
        html.len()
    );

    Ok(RenderedDocument {
        index: page.index,
        total: page.total,
        html,
    })
}

fn write_document(
    conversation: &Conversation,
    page: Page<'_>,
    config: &ExportConfig,
) -> Result<String, std::fmt::Error> {
    let labels = config.locale.labels();
    let renderer = MarkupRenderer::new(config);
    let date = config.locale.long_date(config.now());
    let title = if conversation.title.trim().is_empty() {
        labels.default_title
    } else {
        conversation.title.trim()
    };
    let title = escape_html(title);
    let service = escape_html(conversation.service.label());
    let lang = match config.locale {
        crate::i18n::Locale::En => "en",
        crate::i18n::Locale::Zh => "zh-CN",
    };

    let mut out = String::with_capacity(8 * 1024);

    // ── Head ─────────────────────────────────────────────────────────────
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"{lang}\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width={}, initial-scale=1.0\">",
        config.target_width
    )?;
    writeln!(out, "<title>{title}</title>")?;
    writeln!(out, "<style>{}</style>", stylesheet(config.theme.palette(), config.target_width))?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div class=\"chat-page\">")?;

    // ── Header ───────────────────────────────────────────────────────────
    writeln!(out, "<div class=\"header\">")?;
    writeln!(out, "<h1 class=\"header-title\">{title}</h1>")?;
    write!(
        out,
        "<div class=\"header-meta\"><span>{service}</span><span>•</span><span>{date}</span>"
    )?;
    if page.is_paginated() {
        write!(
            out,
            "<span>•</span><span>{}</span>",
            config.locale.page_indicator(page.index, page.total)
        )?;
    }
    writeln!(out, "</div>")?;
    writeln!(out, "</div>")?;

    // ── Messages ─────────────────────────────────────────────────────────
    writeln!(out, "<div class=\"chat-container\">")?;
    if page.messages.is_empty() {
        writeln!(out, "<div class=\"empty\">{}</div>", labels.empty_page)?;
    }
    for (idx, message) in page.messages.iter().enumerate() {
        write_message(&mut out, idx, message, &renderer, labels)?;
    }

    if page.is_paginated() {
        write_pagination(&mut out, page, config)?;
    }
    writeln!(out, "</div>")?;

    // ── Footer ───────────────────────────────────────────────────────────
    writeln!(out, "<div class=\"footer\">")?;
    writeln!(out, "<div>{}</div>", labels.footer)?;
    writeln!(
        out,
        "<div class=\"chat-tag\"><div class=\"tag-icon\">AI</div><span>{} • {date}</span></div>",
        labels.footer_tag
    )?;
    writeln!(out, "</div>")?;

    writeln!(out, "</div>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}

fn write_message(
    out: &mut String,
    idx: usize,
    message: &Message,
    renderer: &MarkupRenderer,
    labels: &Labels,
) -> std::fmt::Result {
    let (class, name) = if message.role.is_user() {
        ("user", labels.user_name)
    } else {
        ("ai", labels.assistant_name)
    };
    let rendered = renderer.render_message(message);

    writeln!(out, "<div class=\"message {class}\" style=\"--idx:{idx}\">")?;
    writeln!(
        out,
        "<div class=\"message-header\"><div class=\"avatar\">{name}</div><div class=\"message-role\">{name}</div></div>"
    )?;
    writeln!(out, "<div class=\"message-bubble\">{}</div>", rendered.content_html)?;
    if let Some(thinking) = rendered.thinking_html {
        writeln!(
            out,
            "<div class=\"thinking-content\"><div class=\"thinking-label\">{}</div>{thinking}</div>",
            labels.thinking
        )?;
    }
    writeln!(out, "</div>")
}

fn write_pagination(out: &mut String, page: Page<'_>, config: &ExportConfig) -> std::fmt::Result {
    let labels = config.locale.labels();
    writeln!(out, "<div class=\"pagination\">")?;
    if !page.is_first() {
        writeln!(
            out,
            "<a href=\"{}\" class=\"page-button\">{}</a>",
            page_html_name(page.index - 1),
            labels.prev_page
        )?;
    }
    writeln!(
        out,
        "<span class=\"page-info\">{}</span>",
        config.locale.page_indicator(page.index, page.total)
    )?;
    if !page.is_last() {
        writeln!(
            out,
            "<a href=\"{}\" class=\"page-button\">{}</a>",
            page_html_name(page.index + 1),
            labels.next_page
        )?;
    }
    writeln!(out, "</div>")
}

fn stylesheet(p: &Palette, width: u32) -> String {
    format!(
        "*{{margin:0;padding:0;box-sizing:border-box;}}\
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,'Helvetica Neue',Arial,'PingFang SC','Microsoft YaHei',sans-serif;\
background:{bg};color:{text};line-height:1.5715;width:{width}px;}}\
.chat-page{{width:{width}px;background:{surface};}}\
.header{{padding:16px 24px;border-bottom:1px solid {border};}}\
.header-title{{font-size:20px;font-weight:600;color:{heading};margin-bottom:8px;}}\
.header-meta{{display:flex;gap:8px;font-size:14px;color:{secondary};}}\
.chat-container{{padding:24px;}}\
.empty{{text-align:center;color:{secondary};padding:48px 0;}}\
.message{{margin-bottom:24px;}}\
.message-header{{display:flex;align-items:center;gap:8px;margin-bottom:8px;}}\
.avatar{{width:32px;height:32px;border-radius:50%;display:flex;align-items:center;justify-content:center;font-size:14px;font-weight:500;color:#ffffff;}}\
.user .avatar{{background:{user_avatar};}}\
.ai .avatar{{background:{assistant_avatar};}}\
.message-role{{font-size:14px;font-weight:500;}}\
.message-bubble{{padding:12px 16px;border-radius:8px;font-size:14px;max-width:90%;word-wrap:break-word;}}\
.user .message-bubble{{background:{user_bubble};margin-left:auto;border:1px solid {border};}}\
.ai .message-bubble{{background:{assistant_bubble};margin-right:auto;border:1px solid {border};}}\
.message-bubble p{{margin-bottom:12px;}}\
.message-bubble p:last-child{{margin-bottom:0;}}\
.message-bubble table{{border-collapse:collapse;margin:12px 0;}}\
.message-bubble th,.message-bubble td{{border:1px solid {border};padding:4px 8px;}}\
.message-bubble img{{max-width:100%;height:auto;}}\
.thinking-content{{margin-top:16px;padding:20px 16px 16px;background:{quote_bg};border:1px solid {border};border-radius:6px;font-size:14px;color:{secondary};position:relative;}}\
.thinking-label{{position:absolute;top:-10px;left:16px;background:{accent};color:#ffffff;font-size:12px;padding:0 8px;height:20px;line-height:20px;border-radius:10px;}}\
.pagination{{display:flex;justify-content:center;align-items:center;gap:8px;margin-top:16px;}}\
.page-button{{height:32px;padding:0 15px;line-height:30px;font-size:14px;border:1px solid {border};border-radius:6px;color:{text};text-decoration:none;}}\
.page-info{{font-size:14px;color:{secondary};}}\
.footer{{padding:16px 24px;text-align:center;font-size:14px;color:{secondary};border-top:1px solid {border};}}\
.chat-tag{{display:inline-flex;align-items:center;gap:6px;color:{accent};padding:4px 12px;border-radius:16px;font-size:13px;margin-top:12px;border:1px solid {border};}}\
.tag-icon{{width:16px;height:16px;background:{accent};border-radius:50%;color:#ffffff;font-size:10px;font-weight:bold;display:flex;align-items:center;justify-content:center;}}",
        bg = p.background,
        surface = p.surface,
        text = p.text,
        heading = p.heading,
        secondary = p.secondary,
        border = p.border,
        user_bubble = p.user_bubble,
        assistant_bubble = p.assistant_bubble,
        user_avatar = p.user_avatar,
        assistant_avatar = p.assistant_avatar,
        accent = p.accent,
        quote_bg = p.quote_bg,
    )
}

/// Minimal HTML text escaping for chrome fields.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use crate::i18n::Locale;
    use crate::model::ServiceId;
    use crate::pipeline::paginate::paginate;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn frozen() -> ExportConfig {
        ExportConfig::builder()
            .clock(Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
            )))
            .build()
            .unwrap()
    }

    fn convo(messages: Vec<Message>) -> Conversation {
        Conversation::new(ServiceId::Claude, "T", "2026-10-18T12:00:00Z", messages)
    }

    #[test]
    fn single_page_has_chrome_but_no_pagination() {
        let c = convo(vec![Message::user("Hi"), Message::assistant("Hello")]);
        let cfg = frozen();
        let pages = paginate(&c.messages, &cfg);
        let doc = compose_page(&c, pages[0], &cfg).unwrap();

        assert_eq!((doc.index, doc.total), (1, 1));
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("<h1 class=\"header-title\">T</h1>"));
        assert!(doc.html.contains("<span>Claude</span>"));
        assert!(doc.html.contains("October 18, 2026"));
        assert!(doc.html.contains("class=\"message user\""));
        assert!(doc.html.contains("class=\"message ai\""));
        assert!(!doc.html.contains("class=\"pagination\""));
        assert!(!doc.html.contains("Page 1/1"));
        assert!(doc.html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn multi_page_links_to_siblings() {
        let big = "x".repeat(900);
        let c = convo(vec![
            Message::user(big.clone()),
            Message::assistant(big.clone()),
            Message::user(big),
        ]);
        let cfg = frozen();
        let pages = paginate(&c.messages, &cfg);
        assert_eq!(pages.len(), 3);

        let first = compose_page(&c, pages[0], &cfg).unwrap().html;
        assert!(first.contains("Page 1/3"));
        assert!(!first.contains("chat_page_0.html"));
        assert!(first.contains("href=\"chat_page_2.html\""));

        let middle = compose_page(&c, pages[1], &cfg).unwrap().html;
        assert!(middle.contains("href=\"chat_page_1.html\""));
        assert!(middle.contains("href=\"chat_page_3.html\""));

        let last = compose_page(&c, pages[2], &cfg).unwrap().html;
        assert!(last.contains("href=\"chat_page_2.html\""));
        assert!(!last.contains("chat_page_4.html"));
    }

    #[test]
    fn empty_page_is_well_formed() {
        let c = convo(vec![]);
        let cfg = frozen();
        let pages = paginate(&c.messages, &cfg);
        let doc = compose_page(&c, pages[0], &cfg).unwrap();
        assert!(doc.html.contains("No messages in this conversation."));
        assert_eq!(doc.html.matches("<div").count(), doc.html.matches("</div>").count());
    }

    #[test]
    fn composing_twice_is_identical() {
        let c = convo(vec![Message::user("Hi"), Message::assistant("**Hello**").with_thinking("hmm")]);
        let cfg = frozen();
        let pages = paginate(&c.messages, &cfg);
        let a = compose_page(&c, pages[0], &cfg).unwrap();
        let b = compose_page(&c, pages[0], &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_title_falls_back_and_title_is_escaped() {
        let cfg = frozen();
        let c = Conversation::new(ServiceId::ChatGpt, "  ", "", vec![Message::user("q")]);
        let html = compose_page(&c, paginate(&c.messages, &cfg)[0], &cfg).unwrap().html;
        assert!(html.contains("<h1 class=\"header-title\">AI Conversation</h1>"));

        let c = Conversation::new(ServiceId::ChatGpt, "<b>&</b>", "", vec![Message::user("q")]);
        let html = compose_page(&c, paginate(&c.messages, &cfg)[0], &cfg).unwrap().html;
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn thinking_block_is_labelled() {
        let cfg = ExportConfig::builder().locale(Locale::Zh).build().unwrap();
        let c = convo(vec![Message::assistant("a").with_thinking("reasoning")]);
        let html = compose_page(&c, paginate(&c.messages, &cfg)[0], &cfg).unwrap().html;
        assert!(html.contains("<div class=\"thinking-label\">思考过程</div>"));
    }
}

//! File exports: pretty JSON and heading-per-role Markdown transcripts.

use crate::config::{ExportConfig, ExportFormat};
use crate::error::ExportError;
use crate::model::{Conversation, Message};
use chrono::DateTime;
use std::fmt::{self, Write};

/// Serialise one or many conversations in the requested format.
///
/// `all` selects the export-all layout even for a single conversation.
pub fn render_transcript(
    conversations: &[Conversation],
    all: bool,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<String, ExportError> {
    match (format, all) {
        (ExportFormat::Json, false) => match conversations.first() {
            Some(c) => to_json(c),
            None => Err(ExportError::Internal("no conversation to export".into())),
        },
        (ExportFormat::Json, true) => to_json(conversations),
        (ExportFormat::Markdown, false) => match conversations.first() {
            Some(c) => to_markdown(c, config),
            None => Err(ExportError::Internal("no conversation to export".into())),
        },
        (ExportFormat::Markdown, true) => to_markdown_all(conversations, config),
    }
}

/// Pretty-printed JSON with two-space indentation.
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ExportError::Internal(format!("JSON serialisation failed: {e}")))
}

/// Single-conversation transcript:
///
/// ```text
/// # Chat Log
///
/// Date: 2026-10-18 09:30:00 UTC
///
/// ## User
///
/// …
/// ```
pub fn to_markdown(conversation: &Conversation, config: &ExportConfig) -> Result<String, ExportError> {
    let mut md = String::new();
    write_single(&mut md, conversation, config).map_err(formatting_failed)?;
    Ok(md)
}

/// Export-all transcript: one `# Chat N` section per conversation.
pub fn to_markdown_all(conversations: &[Conversation], config: &ExportConfig) -> Result<String, ExportError> {
    let mut md = String::new();
    write_all(&mut md, conversations, config).map_err(formatting_failed)?;
    Ok(md)
}

fn formatting_failed(e: fmt::Error) -> ExportError {
    ExportError::Internal(format!("transcript formatting failed: {e}"))
}

fn write_single(md: &mut String, conversation: &Conversation, config: &ExportConfig) -> fmt::Result {
    let labels = config.locale.labels();
    write!(
        md,
        "# {}\n\n{}: {}\n\n",
        labels.chat_log,
        labels.date,
        config.locale.date_time(config.now())
    )?;
    write_messages(md, &conversation.messages, config)
}

fn write_all(md: &mut String, conversations: &[Conversation], config: &ExportConfig) -> fmt::Result {
    let labels = config.locale.labels();
    write!(
        md,
        "# {}\n\n{}: {}\n\n",
        labels.all_chats,
        labels.export_date,
        config.locale.date_time(config.now())
    )?;

    for (i, convo) in conversations.iter().enumerate() {
        let title = if convo.title.trim().is_empty() {
            labels.untitled
        } else {
            convo.title.trim()
        };
        write!(md, "# {} {}: {}\n\n", labels.chat, i + 1, title)?;
        if let Some(ref id) = convo.id {
            write!(md, "ID: {id}\n\n")?;
        }
        let when = DateTime::parse_from_rfc3339(&convo.timestamp)
            .map(|t| config.locale.date_time(t.to_utc()))
            .unwrap_or_else(|_| convo.timestamp.clone());
        write!(md, "{}: {}\n\n", labels.date, when)?;
        write_messages(md, &convo.messages, config)?;
        md.push_str("---\n\n");
    }
    Ok(())
}

fn write_messages(md: &mut String, messages: &[Message], config: &ExportConfig) -> fmt::Result {
    let labels = config.locale.labels();
    for msg in messages {
        let heading = if msg.role.is_user() {
            labels.transcript_user
        } else {
            labels.transcript_ai
        };
        write!(md, "## {heading}\n\n")?;
        if let Some(thinking) = msg.thinking() {
            writeln!(md, "> **{}**", labels.thinking)?;
            for line in thinking.lines() {
                if line.is_empty() {
                    md.push_str(">\n");
                } else {
                    writeln!(md, "> {line}")?;
                }
            }
            md.push('\n');
        }
        write!(md, "{}\n\n", msg.content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use crate::i18n::Locale;
    use crate::model::ServiceId;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn cfg(locale: Locale) -> ExportConfig {
        ExportConfig::builder()
            .locale(locale)
            .clock(Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            )))
            .build()
            .unwrap()
    }

    fn convo() -> Conversation {
        Conversation::new(
            ServiceId::DeepSeek,
            "Rust",
            "2026-10-01T08:00:00Z",
            vec![
                Message::user("What is Rust?"),
                Message::assistant("A language.").with_thinking("Think\n\nharder"),
            ],
        )
        .with_id("abc")
    }

    #[test]
    fn markdown_single() {
        let md = to_markdown(&convo(), &cfg(Locale::En)).unwrap();
        assert!(md.starts_with("# Chat Log\n\nDate: 2026-10-18 09:30:00 UTC\n\n"));
        assert!(md.contains("## User\n\nWhat is Rust?\n\n"));
        assert!(md.contains("## AI\n\n> **Thinking**\n> Think\n>\n> harder\n\nA language.\n\n"));
    }

    #[test]
    fn markdown_single_zh() {
        let md = to_markdown(&convo(), &cfg(Locale::Zh)).unwrap();
        assert!(md.starts_with("# 聊天记录\n\n日期: "));
        assert!(md.contains("## 用户\n\n"));
    }

    #[test]
    fn markdown_all() {
        let mut untitled = convo();
        untitled.title = String::new();
        untitled.id = None;
        let md = to_markdown_all(&[convo(), untitled], &cfg(Locale::En)).unwrap();
        assert!(md.starts_with("# All Chats\n\nExport date: "));
        assert!(md.contains("# Chat 1: Rust\n\nID: abc\n\nDate: 2026-10-01 08:00:00 UTC\n\n"));
        assert!(md.contains("# Chat 2: Untitled chat\n\nDate: "));
        assert_eq!(md.matches("---\n\n").count(), 2);
    }

    #[test]
    fn json_is_pretty_and_round_trips() {
        let c = convo();
        let json = to_json(&c).unwrap();
        assert!(json.contains("\n  \"service\": \"deepseek\""));
        let back: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn render_dispatches_on_format() {
        let c = [convo()];
        let json = render_transcript(&c, false, ExportFormat::Json, &cfg(Locale::En)).unwrap();
        assert!(json.trim_start().starts_with('{'));
        let all = render_transcript(&c, true, ExportFormat::Json, &cfg(Locale::En)).unwrap();
        assert!(all.trim_start().starts_with('['));
        let md = render_transcript(&c, false, ExportFormat::Markdown, &cfg(Locale::En)).unwrap();
        assert!(md.starts_with("# Chat Log"));
        assert!(render_transcript(&[], false, ExportFormat::Json, &cfg(Locale::En)).is_err());
    }

    #[test]
    fn user_thinking_is_left_out_of_markdown() {
        let c = Conversation::new(
            ServiceId::DeepSeek,
            "T",
            "2026-10-01T08:00:00Z",
            vec![Message::user("q").with_thinking("hidden"), Message::assistant("a")],
        );
        let md = to_markdown(&c, &cfg(Locale::En)).unwrap();
        assert!(!md.contains("hidden"), "got: {md}");
        assert!(!md.contains("> **Thinking**"));
    }

    #[test]
    fn formatting_error_maps_to_internal() {
        match formatting_failed(fmt::Error) {
            ExportError::Internal(msg) => assert!(msg.starts_with("transcript formatting failed")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

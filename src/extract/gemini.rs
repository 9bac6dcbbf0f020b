//! Gemini (and Bard): rows inside `main` or `.conversation-container`.
//!
//! Roles come from `user` / `model` style markers on the row. Rows with no
//! marker alternate, starting with the user.

use super::dom::{body, conversation_from_dom, first_of, has_class, message, outermost, role_or_alternate};
use super::{Extractor, PageSnapshot};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, Message, Role, ServiceId};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").unwrap());
static CONVERSATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".conversation-container").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"div[role="row"]"#).unwrap());
static MESSAGE_DIV: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[class*="message"]"#).unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[class*="content"], div[class*="message-content"]"#).unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiExtractor;

fn explicit_role(row: &ElementRef<'_>) -> Option<Role> {
    let inner = row.inner_html();
    if has_class(row, &["user", "user-message"]) || inner.contains("user-avatar") {
        Some(Role::User)
    } else if has_class(row, &["model", "bot-message", "assistant"]) || inner.contains("model-avatar") {
        Some(Role::Assistant)
    } else {
        None
    }
}

fn parse(doc: &Html) -> Vec<Message> {
    let Some(container) = first_of(doc, &[&*MAIN, &*CONVERSATION]) else {
        return Vec::new();
    };
    let mut rows = outermost(container, &ROW);
    if rows.is_empty() {
        rows = outermost(container, &MESSAGE_DIV);
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let role = role_or_alternate(explicit_role(row), i);
            let content = row.select(&CONTENT).next().unwrap_or(*row);
            message(role, body(&content))
        })
        .collect()
}

#[async_trait]
impl Extractor for GeminiExtractor {
    fn service(&self) -> ServiceId {
        ServiceId::Gemini
    }

    async fn extract(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError> {
        conversation_from_dom(ServiceId::Gemini, snapshot, config, parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(html: &str) -> Result<Conversation, ExportError> {
        let snap = PageSnapshot::from_html("https://gemini.google.com/app/1", html);
        GeminiExtractor.extract(&snap, &ExportConfig::default()).await
    }

    #[tokio::test]
    async fn marked_rows() {
        let convo = run(
            r#"<main>
                 <div role="row" class="model"><div class="text-content">Answer</div></div>
                 <div role="row" class="user"><div class="query-content">Question</div></div>
               </main>"#,
        )
        .await
        .unwrap();
        assert_eq!(convo.messages[0].role, Role::Assistant);
        assert_eq!(convo.messages[0].content, "Answer");
        assert_eq!(convo.messages[1].role, Role::User);
    }

    #[tokio::test]
    async fn unmarked_rows_alternate_and_fall_back_to_row_body() {
        let convo = run(
            r#"<main>
                 <div role="row"><p>one</p></div>
                 <div role="row"><p>two</p></div>
                 <div role="row"><p>three</p></div>
               </main>"#,
        )
        .await
        .unwrap();
        let roles: Vec<Role> = convo.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(convo.messages[1].content, "<p>two</p>");
    }

    #[tokio::test]
    async fn message_divs_when_no_rows() {
        let convo = run(
            r#"<div class="conversation-container">
                 <div class="message user-message"><div class="message-content">Q</div></div>
                 <div class="message"><div class="message-content">A</div></div>
               </div>"#,
        )
        .await
        .unwrap();
        assert_eq!(convo.messages.len(), 2);
        assert_eq!(convo.messages[0].role, Role::User);
        assert_eq!(convo.messages[1].content, "A");
    }

    #[tokio::test]
    async fn no_container_is_empty() {
        assert!(matches!(
            run("<div>nothing</div>").await,
            Err(ExportError::ExtractionEmpty { .. })
        ));
    }
}

//! ChatGPT: every turn carries `data-message-author-role`; the rendered body
//! sits in a `.markdown` element inside it.

use super::dom::{body, conversation_from_dom, message};
use super::{Extractor, PageSnapshot};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, Message, Role, ServiceId};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TURN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-message-author-role]").unwrap());
static MARKDOWN: Lazy<Selector> = Lazy::new(|| Selector::parse(".markdown").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatGptExtractor;

fn parse(doc: &Html) -> Vec<Message> {
    doc.select(&TURN)
        .filter_map(|turn| {
            let role = Role::from_author(turn.value().attr("data-message-author-role")?);
            // User turns on newer layouts have no .markdown wrapper.
            let content = turn.select(&MARKDOWN).next().unwrap_or(turn);
            Some(message(role, body(&content)))
        })
        .collect()
}

#[async_trait]
impl Extractor for ChatGptExtractor {
    fn service(&self) -> ServiceId {
        ServiceId::ChatGpt
    }

    async fn extract(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError> {
        conversation_from_dom(ServiceId::ChatGpt, snapshot, config, parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Borrow checker</title></head><body><main>
        <div data-message-author-role="user"><div class="whitespace-pre-wrap">Why &amp; how?</div></div>
        <div data-message-author-role="assistant"><div class="markdown prose"><p>Because <code>&amp;mut</code>.</p></div></div>
        <div data-message-author-role="assistant"><div class="markdown"></div></div>
    </main></body></html>"#;

    #[tokio::test]
    async fn extracts_roles_and_markdown_bodies() {
        let snap = PageSnapshot::from_html("https://chatgpt.com/c/1", PAGE);
        let convo = ChatGptExtractor
            .extract(&snap, &ExportConfig::default())
            .await
            .unwrap();
        assert_eq!(convo.title, "Borrow checker");
        assert_eq!(convo.messages.len(), 2);
        assert_eq!(convo.messages[0].role, Role::User);
        assert!(convo.messages[0].content.contains("Why &amp; how?"));
        assert_eq!(convo.messages[1].content, "<p>Because <code>&amp;mut</code>.</p>");
    }

    #[tokio::test]
    async fn page_without_turns_is_empty() {
        let snap = PageSnapshot::from_html("https://chatgpt.com/", "<main></main>");
        let err = ChatGptExtractor
            .extract(&snap, &ExportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::ExtractionEmpty {
                service: ServiceId::ChatGpt
            }
        ));
    }
}

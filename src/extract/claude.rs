//! Claude: `.message-container` blocks, user turns marked `user-message`,
//! body in `.message-content`.

use super::dom::{body, conversation_from_dom, has_class, message};
use super::{Extractor, PageSnapshot};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, Message, Role, ServiceId};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static CONTAINER: Lazy<Selector> = Lazy::new(|| Selector::parse(".message-container").unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse(".message-content").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeExtractor;

fn parse(doc: &Html) -> Vec<Message> {
    doc.select(&CONTAINER)
        .filter_map(|c| {
            let role = if has_class(&c, &["user-message"]) {
                Role::User
            } else {
                Role::Assistant
            };
            let content = c.select(&CONTENT).next()?;
            Some(message(role, body(&content)))
        })
        .collect()
}

#[async_trait]
impl Extractor for ClaudeExtractor {
    fn service(&self) -> ServiceId {
        ServiceId::Claude
    }

    async fn extract(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError> {
        conversation_from_dom(ServiceId::Claude, snapshot, config, parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn user_class_decides_role() {
        let snap = PageSnapshot::from_html(
            "https://claude.ai/chat/1",
            r#"<div class="message-container user-message"><div class="message-content">Hello</div></div>
               <div class="message-container"><div class="message-content"><p>Hi!</p></div></div>
               <div class="message-container"><span>no body</span></div>"#,
        );
        let convo = ClaudeExtractor
            .extract(&snap, &ExportConfig::default())
            .await
            .unwrap();
        let roles: Vec<Role> = convo.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(convo.messages[1].content, "<p>Hi!</p>");
    }
}

//! Tencent Yuanbao: message bubbles inside the chat container.
//!
//! Roles come from bubble classes or avatar images; unmarked bubbles
//! alternate, starting with the user.

use super::dom::{body, conversation_from_dom, first_of, has_class, message, outermost, role_or_alternate};
use super::{Extractor, PageSnapshot};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, Message, Role, ServiceId};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static CHAT: Lazy<Selector> = Lazy::new(|| Selector::parse(".chat-container").unwrap());
static CONVERSATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".conversation-container").unwrap());
static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse("main").unwrap());
static BUBBLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[class*="message"], div[class*="chat-message"]"#).unwrap()
});
static USER_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"img[alt*="user"]"#).unwrap());
static BOT_IMG: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"img[alt*="assistant"], img[alt*="bot"]"#).unwrap()
});
static CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[class*="content"], div[class*="message-content"]"#).unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct YuanbaoExtractor;

fn explicit_role(bubble: &ElementRef<'_>) -> Option<Role> {
    let inner = bubble.inner_html();
    if has_class(bubble, &["user", "user-message"])
        || inner.contains("user-avatar")
        || bubble.select(&USER_IMG).next().is_some()
    {
        Some(Role::User)
    } else if has_class(bubble, &["assistant", "bot-message"])
        || inner.contains("bot-avatar")
        || bubble.select(&BOT_IMG).next().is_some()
    {
        Some(Role::Assistant)
    } else {
        None
    }
}

fn parse(doc: &Html) -> Vec<Message> {
    let Some(container) = first_of(doc, &[&*CHAT, &*CONVERSATION, &*MAIN]) else {
        return Vec::new();
    };
    outermost(container, &BUBBLE)
        .iter()
        .enumerate()
        .map(|(i, bubble)| {
            let role = role_or_alternate(explicit_role(bubble), i);
            let content = bubble.select(&CONTENT).next().unwrap_or(*bubble);
            message(role, body(&content))
        })
        .collect()
}

#[async_trait]
impl Extractor for YuanbaoExtractor {
    fn service(&self) -> ServiceId {
        ServiceId::Yuanbao
    }

    async fn extract(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError> {
        conversation_from_dom(ServiceId::Yuanbao, snapshot, config, parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bubbles_with_avatars_and_alternation() {
        let snap = PageSnapshot::from_html(
            "https://yuanbao.tencent.com/chat/1",
            r#"<title>腾讯元宝</title>
               <div class="chat-container">
                 <div class="agent-chat-message"><img alt="bot avatar"><div class="hyc-content">你好</div></div>
                 <div class="agent-chat-message"><img alt="user"><div class="hyc-content">问题</div></div>
                 <div class="agent-chat-message"><div class="hyc-content">无标记</div></div>
                 <div class="agent-chat-message"><div class="hyc-content">再一个</div></div>
               </div>"#,
        );
        let convo = YuanbaoExtractor
            .extract(&snap, &ExportConfig::default())
            .await
            .unwrap();
        let roles: Vec<Role> = convo.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::Assistant, Role::User, Role::User, Role::Assistant]
        );
        assert_eq!(convo.messages[0].content, "你好");
        assert_eq!(convo.title, "腾讯元宝");
    }

    #[tokio::test]
    async fn extract_all_is_current_chat_only() {
        let snap = PageSnapshot::from_html(
            "",
            r#"<main><div class="message user">q</div><div class="message">a</div></main>"#,
        );
        let cfg = ExportConfig::builder()
            .locale(crate::i18n::Locale::Zh)
            .build()
            .unwrap();
        let all = YuanbaoExtractor.extract_all(&snap, &cfg).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "当前聊天");
        assert_eq!(all[0].messages.len(), 2);
    }
}

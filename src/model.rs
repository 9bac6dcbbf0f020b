//! The canonical conversation model every extractor produces.
//!
//! A [`Conversation`] is created once per export operation, read by every
//! later stage, and dropped when the operation completes. Nothing here is
//! persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported chat service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    ChatGpt,
    Claude,
    Gemini,
    DeepSeek,
    Yuanbao,
}

impl ServiceId {
    pub const ALL: [ServiceId; 5] = [
        ServiceId::ChatGpt,
        ServiceId::Claude,
        ServiceId::Gemini,
        ServiceId::DeepSeek,
        ServiceId::Yuanbao,
    ];

    /// Stable lowercase identifier, used in filenames and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::ChatGpt => "chatgpt",
            ServiceId::Claude => "claude",
            ServiceId::Gemini => "gemini",
            ServiceId::DeepSeek => "deepseek",
            ServiceId::Yuanbao => "yuanbao",
        }
    }

    /// Human-facing label shown in the document header.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceId::ChatGpt => "ChatGPT",
            ServiceId::Claude => "Claude",
            ServiceId::Gemini => "Gemini",
            ServiceId::DeepSeek => "DeepSeek",
            ServiceId::Yuanbao => "Yuanbao",
        }
    }

    /// Detect the service behind a page from its URL, then from its title.
    ///
    /// The host is authoritative. Title keywords are only consulted when the
    /// URL matches nothing (saved pages, proxies, mirrors).
    pub fn detect(url: &str, title: &str) -> Option<ServiceId> {
        const HOSTS: &[(&str, ServiceId)] = &[
            ("deepseek.com", ServiceId::DeepSeek),
            ("claude.ai", ServiceId::Claude),
            ("chat.openai.com", ServiceId::ChatGpt),
            ("chatgpt.com", ServiceId::ChatGpt),
            ("gemini.google.com", ServiceId::Gemini),
            ("bard.google.com", ServiceId::Gemini),
            ("yuanbao.tencent.com", ServiceId::Yuanbao),
        ];
        if let Some((_, id)) = HOSTS.iter().find(|(host, _)| url.contains(host)) {
            return Some(*id);
        }

        const TITLES: &[(&str, ServiceId)] = &[
            ("ChatGPT", ServiceId::ChatGpt),
            ("Claude", ServiceId::Claude),
            ("Gemini", ServiceId::Gemini),
            ("Bard", ServiceId::Gemini),
            ("DeepSeek", ServiceId::DeepSeek),
            ("元宝", ServiceId::Yuanbao),
            ("yuanbao", ServiceId::Yuanbao),
        ];
        TITLES
            .iter()
            .find(|(kw, _)| title.contains(kw))
            .map(|(_, id)| *id)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = crate::error::ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ServiceId::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| crate::error::ExportError::UnsupportedService(s.to_string()))
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Map a service-specific author string onto the two canonical roles.
    ///
    /// Anything that is not clearly the user is treated as the assistant,
    /// which matches how every supported service labels its turns.
    pub fn from_author(author: &str) -> Role {
        if author.eq_ignore_ascii_case("user") || author.eq_ignore_ascii_case("human") {
            Role::User
        } else {
            Role::Assistant
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Rich-text body: HTML from DOM extractors, Markdown from storage.
    #[serde(default)]
    pub content: String,
    /// Auxiliary reasoning trace. Only assistant turns carry one;
    /// [`Conversation::new`] clears it on user turns.
    #[serde(
        default,
        rename = "thinking_content",
        alias = "thinkingContent",
        skip_serializing_if = "Option::is_none"
    )]
    pub thinking_content: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            thinking_content: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            thinking_content: None,
        }
    }

    /// Attach a reasoning trace. Empty traces are dropped.
    pub fn with_thinking(mut self, thinking: impl Into<String>) -> Self {
        let thinking = thinking.into();
        self.thinking_content = if thinking.trim().is_empty() {
            None
        } else {
            Some(thinking)
        };
        self
    }

    /// The thinking trace, if present and non-blank. Always `None` for user
    /// turns, including ones deserialised with a stray trace.
    pub fn thinking(&self) -> Option<&str> {
        if self.role.is_user() {
            return None;
        }
        self.thinking_content
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// A message must carry something to render: a body or a thinking trace.
    pub fn is_renderable(&self) -> bool {
        !self.content.trim().is_empty() || self.thinking().is_some()
    }
}

/// One extracted chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Storage id, only known for services that keep sessions on-device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub service: ServiceId,
    #[serde(default)]
    pub title: String,
    /// ISO-8601 timestamp of the extraction (or of the stored session).
    pub timestamp: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Build a conversation, dropping thinking traces from user turns and then
    /// messages that carry nothing to render.
    pub fn new(
        service: ServiceId,
        title: impl Into<String>,
        timestamp: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            id: None,
            service,
            title: title.into(),
            timestamp: timestamp.into(),
            messages: messages
                .into_iter()
                .map(|mut m| {
                    if m.role.is_user() {
                        m.thinking_content = None;
                    }
                    m
                })
                .filter(Message::is_renderable)
                .collect(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A contiguous, ordered slice of a conversation's messages.
///
/// Pages borrow from the conversation, so together they partition the
/// message list without copying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub index: usize,
    /// Total number of pages in the batch.
    pub total: usize,
    pub messages: &'a [Message],
}

impl Page<'_> {
    pub fn is_first(&self) -> bool {
        self.index <= 1
    }

    pub fn is_last(&self) -> bool {
        self.index >= self.total
    }

    pub fn is_paginated(&self) -> bool {
        self.total > 1
    }
}

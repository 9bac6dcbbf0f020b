//! DeepSeek keeps every session on-device in the `deepseek-chat` IndexedDB,
//! object store `history-message`. The CLI reads a JSON dump of that store:
//!
//! ```json
//! [{ "key": "<session uuid>",
//!    "data": {
//!      "chat_session": { "id": "<uuid>", "title": "…", "updated_at": 1760000000.0 },
//!      "chat_messages": [{ "role": "USER", "content": "…", "thinking_content": "…" }]
//!    } }]
//! ```
//!
//! An object of the form `{ "history-message": [ … ] }` is accepted too.
//!
//! The open session is identified by the `/chat/s/<uuid>` segment of the
//! snapshot URL. Unlike the DOM services, export-all returns every stored
//! session.

use super::cache::ElementCache;
use super::{iso8601, Extractor, PageSnapshot};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, Message, Role, ServiceId};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

static RE_SESSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"/chat/s/([0-9a-fA-F-]+)").unwrap());

/// How long a loaded dump is reused before the file is read again.
pub const DEFAULT_DUMP_TTL_SECS: i64 = 30;

// ── Stored layout ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Dump {
    Records(Vec<Record>),
    Store {
        #[serde(rename = "history-message")]
        records: Vec<Record>,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Record {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    chat_session: Option<ChatSession>,
    #[serde(default)]
    data: RecordData,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecordData {
    #[serde(default)]
    chat_session: Option<ChatSession>,
    #[serde(default)]
    chat_messages: Vec<StoredMessage>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatSession {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    /// Seconds since the epoch, fractional.
    #[serde(default)]
    updated_at: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct StoredMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    thinking_content: Option<String>,
}

impl Record {
    fn session(&self) -> Option<&ChatSession> {
        self.data.chat_session.as_ref().or(self.chat_session.as_ref())
    }

    fn id(&self) -> Option<&str> {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or_else(|| self.session().and_then(|s| s.id.as_deref()))
    }

    fn matches(&self, uuid: &str) -> bool {
        self.key.as_deref() == Some(uuid)
            || self.chat_session.as_ref().and_then(|s| s.id.as_deref()) == Some(uuid)
            || self.data.chat_session.as_ref().and_then(|s| s.id.as_deref()) == Some(uuid)
    }

    fn title(&self) -> Option<&str> {
        self.session()
            .and_then(|s| s.title.as_deref())
            .or(self.data.title.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    fn timestamp(&self, now: DateTime<Utc>) -> String {
        if let Some(ts) = self.data.timestamp.as_deref().filter(|t| !t.is_empty()) {
            return ts.to_string();
        }
        self.session()
            .and_then(|s| s.updated_at)
            .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0) as i64))
            .map(iso8601)
            .unwrap_or_else(|| iso8601(now))
    }

    fn messages(&self) -> Vec<Message> {
        self.data
            .chat_messages
            .iter()
            .map(|m| Message {
                role: Role::from_author(&m.role),
                content: m.content.clone().unwrap_or_default(),
                thinking_content: None,
            }
            .with_thinking(m.thinking_content.clone().unwrap_or_default()))
            .collect()
    }

    fn to_conversation(&self, title: &str, now: DateTime<Utc>) -> Conversation {
        let convo = Conversation::new(
            ServiceId::DeepSeek,
            self.title().unwrap_or(title),
            self.timestamp(now),
            self.messages(),
        );
        match self.id() {
            Some(id) => convo.with_id(id),
            None => convo,
        }
    }
}

/// The session uuid in a DeepSeek chat URL.
pub fn session_id(url: &str) -> Option<&str> {
    RE_SESSION
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

// ── Extractor ────────────────────────────────────────────────────────────

/// Reads sessions from a `history-message` dump.
#[derive(Debug, Default)]
pub struct DeepSeekExtractor {
    source: Option<PathBuf>,
    ttl: Option<Duration>,
    cache: Mutex<Option<ElementCache<Arc<Vec<Record>>>>>,
}

impl DeepSeekExtractor {
    pub fn new(dump: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(dump.into()),
            ..Self::default()
        }
    }

    /// Reuse a loaded dump for `ttl` before reading the file again.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn failure(detail: impl Into<String>) -> ExportError {
        ExportError::ExtractionFailure {
            service: ServiceId::DeepSeek,
            detail: detail.into(),
        }
    }

    async fn records(&self, now: DateTime<Utc>) -> Result<Arc<Vec<Record>>, ExportError> {
        let ttl = self
            .ttl
            .unwrap_or_else(|| Duration::seconds(DEFAULT_DUMP_TTL_SECS));
        let mut slot = self.cache.lock().await;
        if let Some(cached) = slot.as_ref() {
            if !cached.is_stale(now, ttl) {
                debug!("Reusing DeepSeek dump captured at {}", cached.captured_at());
                return Ok(Arc::clone(cached.value()));
            }
        }

        let path = self
            .source
            .as_ref()
            .ok_or_else(|| Self::failure("no history-message database dump was provided"))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Self::failure(format!("cannot read {}: {e}", path.display())))?;
        let dump: Dump = serde_json::from_slice(&bytes).map_err(|e| {
            Self::failure(format!("{} is not a history-message dump: {e}", path.display()))
        })?;
        let records = Arc::new(match dump {
            Dump::Records(r) | Dump::Store { records: r } => r,
        });
        info!("Loaded {} DeepSeek records from {}", records.len(), path.display());

        *slot = Some(ElementCache::new(Arc::clone(&records), now));
        Ok(records)
    }
}

#[async_trait]
impl Extractor for DeepSeekExtractor {
    fn service(&self) -> ServiceId {
        ServiceId::DeepSeek
    }

    async fn extract(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError> {
        let empty = ExportError::ExtractionEmpty {
            service: ServiceId::DeepSeek,
        };
        let Some(uuid) = session_id(&snapshot.url) else {
            warn!("No DeepSeek session id in '{}'", snapshot.url);
            return Err(empty);
        };

        let now = config.now();
        let records = self.records(now).await?;
        let Some(record) = records.iter().find(|r| r.matches(uuid)) else {
            warn!("Session {} is not in the DeepSeek dump", uuid);
            return Err(empty);
        };

        let convo = record.to_conversation("", now);
        if convo.is_empty() {
            return Err(empty);
        }
        Ok(convo)
    }

    async fn extract_all(
        &self,
        _snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<Conversation>, ExportError> {
        let now = config.now();
        let untitled = config.locale.labels().untitled;
        let all: Vec<Conversation> = self
            .records(now)
            .await?
            .iter()
            .map(|r| r.to_conversation(untitled, now))
            .filter(|c| !c.is_empty())
            .collect();
        Ok(all)
    }
}

//! Service extractors: page snapshot (or on-device storage) → [`Conversation`].
//!
//! Every supported service implements [`Extractor`]. The export flow only
//! talks to the trait, so adding a service means adding an implementation
//! and registering it, nothing else.
//!
//! ```text
//! PageSnapshot ──▶ ExtractorRegistry::get(service) ──▶ Extractor::extract
//!                                                        │
//!                   DOM services: parse snapshot HTML ───┤
//!                   DeepSeek: read database dump ────────┘──▶ Conversation
//! ```
//!
//! DOM extractors are heuristic: they look for the markup each site uses for
//! a chat turn and keep the turn's inner HTML as the message body. An empty
//! result is reported as [`ExportError::ExtractionEmpty`], never as an empty
//! conversation.

pub mod cache;
pub mod chatgpt;
pub mod claude;
pub mod deepseek;
mod dom;
pub mod gemini;
pub mod poll;
pub mod snapshot;
pub mod yuanbao;

pub use cache::ElementCache;
pub use chatgpt::ChatGptExtractor;
pub use claude::ClaudeExtractor;
pub use deepseek::DeepSeekExtractor;
pub use gemini::GeminiExtractor;
pub use poll::{poll_until, PollOutcome};
pub use snapshot::PageSnapshot;
pub use yuanbao::YuanbaoExtractor;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::{Conversation, ServiceId};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Id given to the single conversation DOM services return for export-all.
pub const CURRENT_CHAT_ID: &str = "current-chat";

/// One chat service's way of finding conversations.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn service(&self) -> ServiceId;

    /// The conversation the snapshot shows.
    async fn extract(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError>;

    /// Every conversation the service makes reachable.
    ///
    /// Services that only expose the open chat return it alone, tagged
    /// [`CURRENT_CHAT_ID`] and titled with the localized "current chat".
    async fn extract_all(
        &self,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<Conversation>, ExportError> {
        let mut convo = self.extract(snapshot, config).await?;
        convo.id = Some(CURRENT_CHAT_ID.to_string());
        convo.title = config.locale.labels().current_chat.to_string();
        Ok(vec![convo])
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Registry ─────────────────────────────────────────────────────────────

/// Extractors keyed by service.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in extractors. DeepSeek starts without a database dump;
    /// register a configured [`DeepSeekExtractor`] to replace it.
    pub fn with_defaults() -> Self {
        let mut r = Self::new();
        r.register(Arc::new(ChatGptExtractor));
        r.register(Arc::new(ClaudeExtractor));
        r.register(Arc::new(GeminiExtractor));
        r.register(Arc::new(DeepSeekExtractor::default()));
        r.register(Arc::new(YuanbaoExtractor));
        r
    }

    /// Add an extractor, replacing any previous one for the same service.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) -> &mut Self {
        let service = extractor.service();
        self.extractors.retain(|e| e.service() != service);
        debug!("Registered extractor for {}", service);
        self.extractors.push(extractor);
        self
    }

    pub fn get(&self, service: ServiceId) -> Result<Arc<dyn Extractor>, ExportError> {
        self.extractors
            .iter()
            .find(|e| e.service() == service)
            .cloned()
            .ok_or_else(|| ExportError::UnsupportedService(service.to_string()))
    }

    pub fn services(&self) -> Vec<ServiceId> {
        self.extractors.iter().map(|e| e.service()).collect()
    }

    pub async fn extract(
        &self,
        service: ServiceId,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Conversation, ExportError> {
        let convo = self.get(service)?.extract(snapshot, config).await?;
        info!(
            "Extracted {} messages from {} ('{}')",
            convo.messages.len(),
            service,
            convo.title
        );
        Ok(convo)
    }

    /// Export-all extraction. Conversations without messages are dropped; if
    /// none remain the result is [`ExportError::ExtractionEmpty`].
    pub async fn extract_all(
        &self,
        service: ServiceId,
        snapshot: &PageSnapshot,
        config: &ExportConfig,
    ) -> Result<Vec<Conversation>, ExportError> {
        let mut all = self.get(service)?.extract_all(snapshot, config).await?;
        all.retain(|c| !c.is_empty());
        if all.is_empty() {
            return Err(ExportError::ExtractionEmpty { service });
        }
        info!("Extracted {} conversations from {}", all.len(), service);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use crate::model::Message;
    use chrono::TimeZone;

    struct Fixed(ServiceId, Vec<Message>);

    #[async_trait]
    impl Extractor for Fixed {
        fn service(&self) -> ServiceId {
            self.0
        }

        async fn extract(
            &self,
            _snapshot: &PageSnapshot,
            config: &ExportConfig,
        ) -> Result<Conversation, ExportError> {
            Ok(Conversation::new(
                self.0,
                "Live title",
                iso8601(config.now()),
                self.1.clone(),
            ))
        }
    }

    fn cfg() -> ExportConfig {
        ExportConfig::builder()
            .clock(Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 10, 18, 8, 5, 3).unwrap(),
            )))
            .build()
            .unwrap()
    }

    #[test]
    fn iso8601_matches_browser_format() {
        let t = Utc.with_ymd_and_hms(2026, 10, 18, 8, 5, 3).unwrap();
        assert_eq!(iso8601(t), "2026-10-18T08:05:03.000Z");
    }

    #[test]
    fn defaults_cover_every_service() {
        let r = ExtractorRegistry::with_defaults();
        for id in ServiceId::ALL {
            assert_eq!(r.get(id).unwrap().service(), id);
        }
    }

    #[test]
    fn register_replaces_same_service() {
        let mut r = ExtractorRegistry::with_defaults();
        r.register(Arc::new(Fixed(ServiceId::Claude, vec![])));
        assert_eq!(r.services().len(), ServiceId::ALL.len());
    }

    #[test]
    fn missing_extractor_is_unsupported() {
        let r = ExtractorRegistry::new();
        assert!(matches!(
            r.get(ServiceId::Gemini),
            Err(ExportError::UnsupportedService(_))
        ));
    }

    #[tokio::test]
    async fn extract_all_defaults_to_current_chat() {
        let mut r = ExtractorRegistry::new();
        r.register(Arc::new(Fixed(ServiceId::ChatGpt, vec![Message::user("hi")])));
        let all = r
            .extract_all(ServiceId::ChatGpt, &PageSnapshot::default(), &cfg())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id.as_deref(), Some(CURRENT_CHAT_ID));
        assert_eq!(all[0].title, "Current chat");
        assert_eq!(all[0].timestamp, "2026-10-18T08:05:03.000Z");
    }

    #[tokio::test]
    async fn extract_all_with_nothing_is_empty_error() {
        let mut r = ExtractorRegistry::new();
        r.register(Arc::new(Fixed(ServiceId::Claude, vec![Message::user(" ")])));
        let err = r
            .extract_all(ServiceId::Claude, &PageSnapshot::default(), &cfg())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ExtractionEmpty { .. }));
    }
}

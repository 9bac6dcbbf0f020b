//! Prompt template library persisted under the `promptTemplates` key.
//!
//! Templates are stored as one JSON array so the layout stays compatible
//! with what the browser build writes:
//!
//! ```json
//! [{ "id": "…", "title": "…", "content": "…",
//!    "createdAt": "…", "updatedAt": "…", "isFavorite": false }]
//! ```

use crate::config::{Clock, SystemClock};
use crate::error::ExportError;
use crate::storage::{get_typed, set_typed, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub const KEY_PROMPT_TEMPLATES: &str = "promptTemplates";

/// A saved prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Input to [`PromptLibrary::save`].
///
/// With an `id` matching a stored template, the template is updated in place;
/// otherwise a new one is added.
#[derive(Debug, Clone, Default)]
pub struct PromptDraft {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    /// `None` keeps the stored flag on update and means "not favourite" on create.
    pub is_favorite: Option<bool>,
}

impl PromptDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn favorite(mut self, v: bool) -> Self {
        self.is_favorite = Some(v);
        self
    }
}

/// CRUD over the stored template list.
pub struct PromptLibrary<'a> {
    store: &'a dyn KeyValueStore,
    clock: Arc<dyn Clock>,
}

impl<'a> PromptLibrary<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Favourites first, then most recently updated.
    pub async fn list(&self) -> Result<Vec<PromptTemplate>, ExportError> {
        let mut templates = self.load().await?;
        templates.sort_by(|a, b| {
            b.is_favorite
                .cmp(&a.is_favorite)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        Ok(templates)
    }

    pub async fn get(&self, id: &str) -> Result<Option<PromptTemplate>, ExportError> {
        Ok(self.load().await?.into_iter().find(|t| t.id == id))
    }

    /// Create or update a template.
    ///
    /// Updates keep `createdAt`; both paths stamp `updatedAt` with now.
    pub async fn save(&self, draft: PromptDraft) -> Result<PromptTemplate, ExportError> {
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "Prompt template needs both a title and content".into(),
            ));
        }

        let now = self.clock.now();
        let mut templates = self.load().await?;
        let existing = draft
            .id
            .as_deref()
            .and_then(|id| templates.iter().position(|t| t.id == id));

        let saved = match existing {
            Some(i) => {
                let t = &mut templates[i];
                t.title = draft.title;
                t.content = draft.content;
                t.updated_at = now;
                if let Some(fav) = draft.is_favorite {
                    t.is_favorite = fav;
                }
                t.clone()
            }
            None => {
                let t = PromptTemplate {
                    id: draft
                        .id
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    title: draft.title,
                    content: draft.content,
                    created_at: now,
                    updated_at: now,
                    is_favorite: draft.is_favorite.unwrap_or(false),
                };
                templates.push(t.clone());
                t
            }
        };

        self.store_all(&templates).await?;
        info!("Saved prompt template '{}' ({})", saved.title, saved.id);
        Ok(saved)
    }

    /// Remove a template. Returns whether anything was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, ExportError> {
        let mut templates = self.load().await?;
        let before = templates.len();
        templates.retain(|t| t.id != id);
        if templates.len() == before {
            return Ok(false);
        }
        self.store_all(&templates).await?;
        Ok(true)
    }

    /// Flip the favourite flag. Returns the new state, or `None` if no such id.
    pub async fn toggle_favorite(&self, id: &str) -> Result<Option<bool>, ExportError> {
        let mut templates = self.load().await?;
        let Some(t) = templates.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        t.is_favorite = !t.is_favorite;
        t.updated_at = self.clock.now();
        let state = t.is_favorite;
        self.store_all(&templates).await?;
        Ok(Some(state))
    }

    async fn load(&self) -> Result<Vec<PromptTemplate>, ExportError> {
        Ok(get_typed(self.store, KEY_PROMPT_TEMPLATES)
            .await?
            .unwrap_or_default())
    }

    async fn store_all(&self, templates: &[PromptTemplate]) -> Result<(), ExportError> {
        set_typed(self.store, KEY_PROMPT_TEMPLATES, &templates).await
    }
}

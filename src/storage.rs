//! Awaitable key/value storage for settings and prompt templates.
//!
//! The pipeline only depends on [`KeyValueStore`]: `get(key)` and
//! `set(key, value)` returning futures. Two backends ship with the crate: a
//! JSON file for the CLI and an in-memory map for tests and embedding.

use crate::config::ExportFormat;
use crate::error::ExportError;
use crate::i18n::Locale;
use crate::theme::Theme;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Stored preference: export file format (`"json"` | `"markdown"`).
pub const KEY_EXPORT_FORMAT: &str = "exportFormat";
/// Stored preference: theme name.
pub const KEY_THEME: &str = "theme";
/// Stored preference: UI language (`"en"` | `"zh"`).
pub const KEY_LANGUAGE: &str = "language";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// The value under `key`, or `None` if unset.
    async fn get(&self, key: &str) -> Result<Option<Value>, ExportError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), ExportError>;

    async fn remove(&self, key: &str) -> Result<(), ExportError>;
}

/// Fetch and deserialise a value, treating malformed data as unset.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, ExportError> {
    match store.get(key).await? {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match serde_json::from_value(v) {
            Ok(t) => Ok(Some(t)),
            Err(e) => {
                warn!("Ignoring malformed stored value for '{}': {}", key, e);
                Ok(None)
            }
        },
    }
}

/// Serialise and store a value.
pub async fn set_typed<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), ExportError> {
    let v = serde_json::to_value(value).map_err(|e| ExportError::Storage(e.to_string()))?;
    store.set(key, v).await
}

// ── In-memory backend ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ExportError> {
        Ok(self.inner.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ExportError> {
        self.inner.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ExportError> {
        self.inner.lock().await.remove(key);
        Ok(())
    }
}

// ── JSON file backend ────────────────────────────────────────────────────

/// A single JSON object on disk, rewritten atomically on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `$XDG_CONFIG_HOME/chatshot/storage.json`, else `~/.config/chatshot/storage.json`.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("chatshot").join("storage.json"))
    }

    async fn read_map(&self) -> Result<Map<String, Value>, ExportError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(ExportError::Storage(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ExportError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(ExportError::Storage(format!(
                "{} is not valid JSON: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<(), ExportError> {
        let storage_err = |e: std::io::Error| {
            ExportError::Storage(format!("cannot write {}: {e}", self.path.display()))
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }
        let body = serde_json::to_vec_pretty(map).map_err(|e| ExportError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(storage_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(storage_err)?;
        debug!("Saved {} keys to {}", map.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ExportError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ExportError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), ExportError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

// ── Settings ─────────────────────────────────────────────────────────────

/// User preferences read by the export pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub export_format: ExportFormat,
    pub theme: Theme,
    pub language: Locale,
}

impl Settings {
    /// Load preferences. Missing or unrecognised values keep their defaults.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, ExportError> {
        let text = |v: Option<Value>| v.and_then(|v| v.as_str().map(str::to_string));

        let mut s = Settings::default();
        if let Some(f) = text(store.get(KEY_EXPORT_FORMAT).await?) {
            s.export_format = f.parse().unwrap_or_default();
        }
        if let Some(t) = text(store.get(KEY_THEME).await?) {
            s.theme = t.parse().unwrap_or_default();
        }
        if let Some(l) = text(store.get(KEY_LANGUAGE).await?) {
            s.language = if l.to_ascii_lowercase().starts_with("zh") {
                Locale::Zh
            } else {
                Locale::En
            };
        }
        Ok(s)
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), ExportError> {
        let format = match self.export_format {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
        };
        let language = match self.language {
            Locale::En => "en",
            Locale::Zh => "zh",
        };
        store.set(KEY_EXPORT_FORMAT, Value::from(format)).await?;
        store.set(KEY_THEME, Value::from(self.theme.as_str())).await?;
        store.set(KEY_LANGUAGE, Value::from(language)).await
    }
}

//! Configuration types for chat export and rendering.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. Every knob lives in one struct so a single value
//! can be shared by the paginator, the composer, and the rasteriser.

use crate::error::ExportError;
use crate::i18n::Locale;
use crate::progress::{Notifier, ProgressCallback};
use crate::theme::Theme;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Default per-page length budget, in estimated length units.
pub const DEFAULT_PAGE_BUDGET: usize = 1500;
/// Extra length charged for every fenced code block.
pub const DEFAULT_CODE_BLOCK_PENALTY: usize = 200;
/// Weight applied to thinking-trace length.
pub const DEFAULT_THINKING_WEIGHT: f64 = 0.7;
/// Default raster width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 750;

/// Source of "now" for every render-time field.
///
/// Documents embed the export date. Injecting the clock keeps composition
/// byte-for-byte reproducible under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Configuration for an export operation.
///
/// # Example
/// ```rust
/// use chatshot::{ExportConfig, Theme};
///
/// let config = ExportConfig::builder()
///     .page_budget(1200)
///     .theme(Theme::Dark)
///     .build()
///     .unwrap();
/// assert_eq!(config.page_budget, 1200);
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Estimated-length budget per rendered page. Default: 1500.
    pub page_budget: usize,

    /// Length charged per fenced code block on top of its characters. Default: 200.
    ///
    /// Code blocks render in a padded monospace box and take far more
    /// vertical room than their character count suggests.
    pub code_block_penalty: usize,

    /// Multiplier for thinking-trace length. Default: 0.7.
    pub thinking_weight: f64,

    /// Split conversations into pages. Default: true.
    ///
    /// When false every message lands on a single page regardless of length.
    pub paginate: bool,

    /// Raster width in pixels. Height always follows the content. Default: 750.
    pub target_width: u32,

    /// Colour theme. Default: light.
    pub theme: Theme,

    /// Language for document chrome and transcript headings. Default: English.
    pub locale: Locale,

    /// File format for export-as-file. Default: JSON.
    pub format: ExportFormat,

    /// Directory for every written artifact. Default: current directory.
    pub output_dir: PathBuf,

    /// Per-page progress events for the render batch.
    pub progress_callback: Option<ProgressCallback>,

    /// Receives user-visible notices (fallbacks, failures).
    pub notifier: Option<Arc<dyn Notifier>>,

    /// Time source for render-time fields.
    pub clock: Arc<dyn Clock>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_budget: DEFAULT_PAGE_BUDGET,
            code_block_penalty: DEFAULT_CODE_BLOCK_PENALTY,
            thinking_weight: DEFAULT_THINKING_WEIGHT,
            paginate: true,
            target_width: DEFAULT_TARGET_WIDTH,
            theme: Theme::default(),
            locale: Locale::default(),
            format: ExportFormat::default(),
            output_dir: PathBuf::from("."),
            progress_callback: None,
            notifier: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("page_budget", &self.page_budget)
            .field("code_block_penalty", &self.code_block_penalty)
            .field("thinking_weight", &self.thinking_weight)
            .field("paginate", &self.paginate)
            .field("target_width", &self.target_width)
            .field("theme", &self.theme)
            .field("locale", &self.locale)
            .field("format", &self.format)
            .field("output_dir", &self.output_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExportProgressCallback>"),
            )
            .field("notifier", &self.notifier.as_ref().map(|_| "<dyn Notifier>"))
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Current render time from the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Forward a notice to the configured notifier, if any.
    pub(crate) fn notify(&self, level: crate::progress::NoticeLevel, message: &str) {
        if let Some(ref n) = self.notifier {
            n.notify(level, message);
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn page_budget(mut self, budget: usize) -> Self {
        self.config.page_budget = budget;
        self
    }

    pub fn code_block_penalty(mut self, penalty: usize) -> Self {
        self.config.code_block_penalty = penalty;
        self
    }

    pub fn thinking_weight(mut self, weight: f64) -> Self {
        self.config.thinking_weight = weight;
        self
    }

    pub fn paginate(mut self, v: bool) -> Self {
        self.config.paginate = v;
        self
    }

    pub fn target_width(mut self, px: u32) -> Self {
        self.config.target_width = px;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.config.notifier = Some(notifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.config.clock = clock;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.page_budget == 0 {
            return Err(ExportError::InvalidConfig(
                "Page budget must be ≥ 1".into(),
            ));
        }
        if !(320..=4096).contains(&c.target_width) {
            return Err(ExportError::InvalidConfig(format!(
                "Target width must be 320–4096 px, got {}",
                c.target_width
            )));
        }
        if !(0.0..=1.0).contains(&c.thinking_weight) {
            return Err(ExportError::InvalidConfig(format!(
                "Thinking weight must be within 0–1, got {}",
                c.thinking_weight
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// File format for export-as-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed conversation object. (default)
    #[default]
    Json,
    /// Heading-per-role transcript.
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    /// `md` and `markdown` select Markdown; anything else falls back to JSON.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => ExportFormat::Markdown,
            _ => ExportFormat::Json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults() {
        let c = ExportConfig::default();
        assert_eq!(c.page_budget, 1500);
        assert_eq!(c.code_block_penalty, 200);
        assert!((c.thinking_weight - 0.7).abs() < f64::EPSILON);
        assert_eq!(c.target_width, 750);
        assert!(c.paginate);
    }

    #[test]
    fn builder_rejects_zero_budget() {
        let err = ExportConfig::builder().page_budget(0).build().unwrap_err();
        assert!(err.to_string().contains("Page budget"));
    }

    #[test]
    fn builder_rejects_narrow_width() {
        assert!(ExportConfig::builder().target_width(100).build().is_err());
        assert!(ExportConfig::builder().target_width(1080).build().is_ok());
    }

    #[test]
    fn builder_rejects_weight_out_of_range() {
        assert!(ExportConfig::builder().thinking_weight(1.5).build().is_err());
    }

    #[test]
    fn fixed_clock_is_frozen() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let c = ExportConfig::builder()
            .clock(Arc::new(FixedClock(at)))
            .build()
            .unwrap();
        assert_eq!(c.now(), at);
        assert_eq!(c.now(), at);
    }

    #[test]
    fn export_format_parse() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("Markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("xml".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    }
}

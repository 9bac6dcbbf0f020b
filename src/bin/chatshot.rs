//! CLI binary for chatshot.
//!
//! A thin shim over the library crate that maps CLI flags and stored
//! settings to `ExportConfig` and prints results.

use anyhow::{bail, Context, Result};
use chatshot::extract::snapshot::{load_snapshot, wait_for_snapshot};
use chatshot::extract::{DeepSeekExtractor, ExtractorRegistry};
use chatshot::pipeline::package::{CommandClipboard, ImageClipboard, NoClipboard};
use chatshot::pipeline::rasterize::CommandRasterizer;
use chatshot::prompts::{PromptDraft, PromptLibrary};
use chatshot::storage::{JsonFileStore, Settings};
use chatshot::{
    ExportConfig, ExportFormat, ExportOutput, ExportProgressCallback, ExportRequest, Exporter,
    Locale, NoticeLevel, Notifier, PageSnapshot, ProgressCallback, ServiceId, ShareDelivery, Theme,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per rendered page.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_render_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading conversation…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }

    fn elapsed_ms(&self, page_num: usize) -> u128 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&page_num))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_render_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_pages} page(s)…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, png_len: usize) {
        let elapsed_ms = self.elapsed_ms(page_num);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>6} KiB", png_len / 1024)),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let elapsed_ms = self.elapsed_ms(page_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_render_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} page(s) rendered",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages rendered  ({} failed)",
                if failed == total_pages { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

/// Prints user-facing notices to stderr.
struct CliNotifier;

impl Notifier for CliNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let tag = match level {
            NoticeLevel::Info => cyan("ℹ"),
            NoticeLevel::Success => green("✔"),
            NoticeLevel::Warning => yellow("⚠"),
            NoticeLevel::Error => red("✘"),
        };
        eprintln!("{tag} {message}");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Save the chat open in a saved page as Markdown
  chatshot export chat.html --format markdown

  # Every DeepSeek session from an IndexedDB dump
  chatshot export-all --deepseek-db history-message.json --service deepseek

  # Paginated images, zipped, dark theme
  chatshot render chat.html --zip --theme dark -o out/

  # Copy page 2 to the clipboard (falls back to a download)
  chatshot render chat.html --page 2 --copy

  # Prompt templates
  chatshot prompts add --title "Summarise" --content "Summarise the above in 3 bullets"
  chatshot prompts list

SNAPSHOTS:
  A snapshot is the chat page saved from the browser ("Save page as…",
  HTML only) or fetched from a URL. The service is detected from the page
  address and title; pass --service when detection fails.

RASTERISER:
  Page images are produced by an external HTML renderer. The default is
  wkhtmltoimage; any program accepting the same arguments works:
    chatshot render chat.html --rasterizer /opt/bin/wkhtmltoimage

ENVIRONMENT VARIABLES:
  CHATSHOT_OUTPUT_DIR   Directory for written files
  CHATSHOT_STORE        Settings / prompt store (default ~/.config/chatshot/storage.json)
  CHATSHOT_DEEPSEEK_DB  DeepSeek history-message dump
  CHATSHOT_RASTERIZER   Rasteriser program
  RUST_LOG              Log filter (overrides --verbose)
"#;

/// Export AI chat conversations to JSON, Markdown and shareable images.
#[derive(Parser, Debug)]
#[command(
    name = "chatshot",
    version,
    about = "Export AI chat conversations to JSON, Markdown and shareable images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory for written files.
    #[arg(short, long, global = true, env = "CHATSHOT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Settings and prompt-template store.
    #[arg(long, global = true, env = "CHATSHOT_STORE")]
    store: Option<PathBuf>,

    /// Language for document chrome and transcripts (overrides the stored setting).
    #[arg(long, global = true, value_enum)]
    lang: Option<LangArg>,

    /// Disable progress bar.
    #[arg(long, global = true, env = "CHATSHOT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CHATSHOT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CHATSHOT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the open conversation as JSON or Markdown.
    Export {
        #[command(flatten)]
        source: SourceArgs,
        /// File format (overrides the stored setting).
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Export every reachable conversation as one file.
    ExportAll {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Render the open conversation into paginated PNG images.
    Render {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Manage saved prompt templates.
    Prompts {
        #[command(subcommand)]
        action: PromptAction,
    },
    /// Show or change stored preferences.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Saved chat page (path or HTTP/HTTPS URL). Optional for DeepSeek export-all.
    snapshot: Option<String>,

    /// Chat service; detected from the snapshot when omitted.
    #[arg(long, value_enum)]
    service: Option<ServiceArg>,

    /// Page address to assume for a saved snapshot (service detection, DeepSeek session).
    #[arg(long)]
    url: Option<String>,

    /// DeepSeek `history-message` IndexedDB dump (JSON).
    #[arg(long, env = "CHATSHOT_DEEPSEEK_DB")]
    deepseek_db: Option<PathBuf>,

    /// Wait up to this many seconds for the snapshot file to appear.
    #[arg(long, default_value_t = 0)]
    wait: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, default_value_t = 60)]
    download_timeout: u64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Bundle all pages into one ZIP archive.
    #[arg(long, conflicts_with_all = ["page", "html"])]
    zip: bool,

    /// Render a single page only.
    #[arg(long)]
    page: Option<usize>,

    /// With --page: copy the image to the clipboard instead of writing it.
    #[arg(long, requires = "page")]
    copy: bool,

    /// Write the composed HTML pages instead of images.
    #[arg(long)]
    html: bool,

    /// Colour theme (overrides the stored setting).
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Image width in pixels.
    #[arg(long, default_value_t = chatshot::config::DEFAULT_TARGET_WIDTH,
          value_parser = clap::value_parser!(u32).range(320..=4096))]
    width: u32,

    /// Estimated-length budget per page.
    #[arg(long, default_value_t = chatshot::config::DEFAULT_PAGE_BUDGET)]
    page_budget: usize,

    /// Put the whole conversation on a single page.
    #[arg(long)]
    no_paginate: bool,

    /// HTML-to-image program (wkhtmltoimage-compatible).
    #[arg(long, env = "CHATSHOT_RASTERIZER", default_value = "wkhtmltoimage")]
    rasterizer: String,

    /// Per-page rasteriser timeout in seconds.
    #[arg(long, default_value_t = chatshot::pipeline::rasterize::DEFAULT_RASTER_TIMEOUT_SECS)]
    raster_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum PromptAction {
    /// List templates, favourites first.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Add a template. `--content -` reads the content from stdin.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        favorite: bool,
    },
    /// Change a template's title or content.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a template.
    Delete { id: String },
    /// Toggle a template's favourite flag.
    Favorite { id: String },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the stored preferences.
    Show,
    /// Store new preferences.
    Set {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,
        #[arg(long, value_enum)]
        lang: Option<LangArg>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ServiceArg {
    Chatgpt,
    Claude,
    Gemini,
    Deepseek,
    Yuanbao,
}

impl From<ServiceArg> for ServiceId {
    fn from(v: ServiceArg) -> Self {
        match v {
            ServiceArg::Chatgpt => ServiceId::ChatGpt,
            ServiceArg::Claude => ServiceId::Claude,
            ServiceArg::Gemini => ServiceId::Gemini,
            ServiceArg::Deepseek => ServiceId::DeepSeek,
            ServiceArg::Yuanbao => ServiceId::Yuanbao,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Json,
    Markdown,
}

impl From<FormatArg> for ExportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Markdown => ExportFormat::Markdown,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Light,
    Dark,
    Sepia,
    Contrast,
}

impl From<ThemeArg> for Theme {
    fn from(v: ThemeArg) -> Self {
        match v {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Sepia => Theme::Sepia,
            ThemeArg::Contrast => Theme::Contrast,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LangArg {
    En,
    Zh,
}

impl From<LangArg> for Locale {
    fn from(v: LangArg) -> Self {
        match v {
            LangArg::En => Locale::En,
            LangArg::Zh => Locale::Zh,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are noise next to the progress bar.
    let is_render = matches!(cli.command, Command::Render { .. });
    let show_progress = is_render && !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Stored settings ──────────────────────────────────────────────────
    let store_path = match cli.store.clone().or_else(JsonFileStore::default_path) {
        Some(p) => p,
        None => bail!("Cannot locate a settings store; pass --store or set CHATSHOT_STORE"),
    };
    let store = JsonFileStore::new(store_path);
    let settings = Settings::load(&store)
        .await
        .context("Failed to read stored settings")?;

    match &cli.command {
        Command::Prompts { action } => run_prompts(&store, action).await,
        Command::Settings { action } => run_settings(&store, settings, action.as_ref()).await,
        Command::Export { source, format } => {
            let format = format.map(Into::into).unwrap_or(settings.export_format);
            run_export(&cli, source, settings, None, |service| ExportRequest::ExportFile {
                service,
                format,
            })
            .await
        }
        Command::ExportAll { source, format } => {
            let format = format.map(Into::into).unwrap_or(settings.export_format);
            run_export(&cli, source, settings, None, |service| ExportRequest::ExportAll {
                service,
                format,
            })
            .await
        }
        Command::Render { source, render } => {
            let delivery = if render.zip {
                ShareDelivery::Zip
            } else if render.html {
                ShareDelivery::Documents
            } else if let Some(page) = render.page {
                ShareDelivery::Page {
                    page,
                    copy: render.copy,
                }
            } else {
                ShareDelivery::Images
            };
            run_export(&cli, source, settings, Some(render), |service| {
                ExportRequest::RenderForSharing { service, delivery }
            })
            .await
        }
    }
}

/// Resolve the snapshot and service, build the config, run one request.
async fn run_export(
    cli: &Cli,
    source: &SourceArgs,
    settings: Settings,
    render: Option<&RenderArgs>,
    request: impl FnOnce(ServiceId) -> ExportRequest,
) -> Result<()> {
    let snapshot = resolve_snapshot(source).await?;
    let service = match source.service {
        Some(s) => s.into(),
        None => match ServiceId::detect(&snapshot.url, &snapshot.title) {
            Some(s) => s,
            None => bail!(
                "Could not detect the chat service of '{}'; pass --service",
                snapshot.url
            ),
        },
    };
    let request = request(service);

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if render.is_some() && !cli.quiet && !cli.no_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, settings, render, progress)?;

    // ── Collaborators ────────────────────────────────────────────────────
    let mut registry = ExtractorRegistry::with_defaults();
    if let Some(ref db) = source.deepseek_db {
        registry.register(Arc::new(DeepSeekExtractor::new(db)));
    }

    let rasterizer = match render {
        Some(r) => CommandRasterizer::with_program(&r.rasterizer)
            .timeout(Duration::from_secs(r.raster_timeout)),
        None => CommandRasterizer::wkhtmltoimage(),
    };
    let clipboard: Arc<dyn ImageClipboard> = match CommandClipboard::detect() {
        Some(c) => Arc::new(c),
        None => Arc::new(NoClipboard),
    };
    let exporter = Exporter::new(Arc::new(rasterizer))
        .extractors(registry)
        .clipboard(clipboard);

    // ── Run ──────────────────────────────────────────────────────────────
    let output = exporter
        .run(&request, &snapshot, &config)
        .await
        .context("Export failed")?;

    if !cli.quiet {
        print_summary(&output);
    }
    Ok(())
}

async fn resolve_snapshot(source: &SourceArgs) -> Result<PageSnapshot> {
    let mut snapshot = match source.snapshot.as_deref() {
        Some(input) if source.wait > 0 && !chatshot::extract::snapshot::is_url(input) => {
            wait_for_snapshot(Path::new(input), source.wait as u32 * 4, Duration::from_millis(250))
                .await
                .with_context(|| format!("Failed to read snapshot '{input}'"))?
        }
        Some(input) => load_snapshot(input, source.download_timeout)
            .await
            .with_context(|| format!("Failed to read snapshot '{input}'"))?,
        // DeepSeek export-all needs only the database dump.
        None if source.deepseek_db.is_some() => PageSnapshot::default(),
        None => bail!("A snapshot path or URL is required"),
    };
    if let Some(ref url) = source.url {
        snapshot = snapshot.with_url(url);
    }
    Ok(snapshot)
}

/// Map CLI args and stored settings to `ExportConfig`.
fn build_config(
    cli: &Cli,
    settings: Settings,
    render: Option<&RenderArgs>,
    progress: Option<ProgressCallback>,
) -> Result<ExportConfig> {
    let locale = cli.lang.map(Into::into).unwrap_or(settings.language);
    let mut builder = ExportConfig::builder()
        .locale(locale)
        .format(settings.export_format)
        .theme(settings.theme);

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if !cli.quiet {
        builder = builder.notifier(Arc::new(CliNotifier));
    }
    if let Some(r) = render {
        builder = builder
            .target_width(r.width)
            .page_budget(r.page_budget)
            .paginate(!r.no_paginate);
        if let Some(t) = r.theme {
            builder = builder.theme(t.into());
        }
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &ExportOutput) {
    for a in &output.artifacts {
        eprintln!(
            "   {}  {}",
            bold(&a.path.display().to_string()),
            dim(&format!("{} bytes, {}", a.bytes, a.mime_type)),
        );
    }
    let s = &output.stats;
    if s.total_pages > 0 {
        eprintln!(
            "   {} message(s), {}/{} page(s) in {}ms",
            s.messages, s.rendered_pages, s.total_pages, s.total_duration_ms
        );
    } else {
        eprintln!(
            "   {} conversation(s), {} message(s) in {}ms",
            s.conversations, s.messages, s.total_duration_ms
        );
    }
}

// ── prompts / settings ───────────────────────────────────────────────────────

async fn run_prompts(store: &JsonFileStore, action: &PromptAction) -> Result<()> {
    let library = PromptLibrary::new(store);
    match action {
        PromptAction::List { json } => {
            let templates = library.list().await.context("Failed to read prompt templates")?;
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&templates).context("Failed to serialise templates")?
                );
            } else if templates.is_empty() {
                eprintln!("{}", dim("No prompt templates yet."));
            } else {
                for t in &templates {
                    let star = if t.is_favorite { yellow("★") } else { " ".to_string() };
                    println!("{star} {}  {}", dim(&t.id), bold(&t.title));
                }
            }
        }
        PromptAction::Add {
            title,
            content,
            favorite,
        } => {
            let content = read_content(content)?;
            let t = library
                .save(PromptDraft::new(title.as_str(), content).favorite(*favorite))
                .await
                .context("Failed to save prompt template")?;
            println!("{}", t.id);
        }
        PromptAction::Edit { id, title, content } => {
            let Some(current) = library.get(id).await? else {
                bail!("No prompt template with id '{id}'");
            };
            let content = match content {
                Some(c) => read_content(c)?,
                None => current.content,
            };
            let title = title.clone().unwrap_or(current.title);
            library
                .save(PromptDraft::new(title, content).with_id(id.as_str()))
                .await
                .context("Failed to save prompt template")?;
        }
        PromptAction::Delete { id } => {
            if !library.delete(id).await? {
                bail!("No prompt template with id '{id}'");
            }
        }
        PromptAction::Favorite { id } => match library.toggle_favorite(id).await? {
            Some(state) => println!("{}", if state { "favorite" } else { "not favorite" }),
            None => bail!("No prompt template with id '{id}'"),
        },
    }
    Ok(())
}

/// `-` reads the value from stdin.
fn read_content(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read content from stdin")?;
    Ok(buf)
}

async fn run_settings(
    store: &JsonFileStore,
    mut settings: Settings,
    action: Option<&SettingsAction>,
) -> Result<()> {
    if let Some(SettingsAction::Set { format, theme, lang }) = action {
        if let Some(f) = format {
            settings.export_format = (*f).into();
        }
        if let Some(t) = theme {
            settings.theme = (*t).into();
        }
        if let Some(l) = lang {
            settings.language = (*l).into();
        }
        settings
            .save(store)
            .await
            .context("Failed to write settings")?;
    }
    println!("store:   {}", store.path().display());
    println!("format:  {}", settings.export_format.extension());
    println!("theme:   {}", settings.theme.as_str());
    println!(
        "lang:    {}",
        match settings.language {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    );
    Ok(())
}

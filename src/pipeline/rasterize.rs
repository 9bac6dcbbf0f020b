//! Rasterisation seam: a composed HTML document → a full-height bitmap.
//!
//! The core only depends on [`Rasterizer`]. [`CommandRasterizer`] drives an
//! external HTML renderer (`wkhtmltoimage` by default) through a temp
//! directory; tests plug in an in-process fake.
//!
//! ## Why a temp directory?
//!
//! External renderers read and write files, not pipes. A `TempDir` gives
//! both files a private home that is removed on drop, even if the renderer
//! hangs and the call is abandoned on timeout.

use crate::error::RasterError;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

/// Turns a document into a bitmap at a fixed width.
///
/// Implementations must capture the document's full content height. A
/// viewport-sized capture that truncates long pages is a bug.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, html: &str, width: u32) -> Result<DynamicImage, RasterError>;
}

/// Default per-page timeout for external renderers.
pub const DEFAULT_RASTER_TIMEOUT_SECS: u64 = 60;

/// Runs an external program that renders an HTML file to a PNG file.
///
/// Arguments are a template: `{width}`, `{input}` and `{output}` are
/// substituted per call.
#[derive(Debug, Clone)]
pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRasterizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(DEFAULT_RASTER_TIMEOUT_SECS),
        }
    }

    /// `wkhtmltoimage`, which sizes the image to the full document height
    /// when no height is given.
    pub fn wkhtmltoimage() -> Self {
        Self::with_program("wkhtmltoimage")
    }

    /// A `wkhtmltoimage`-compatible binary at a custom path.
    pub fn with_program(program: impl Into<String>) -> Self {
        let args = [
            "--quiet",
            "--encoding",
            "utf-8",
            "--format",
            "png",
            "--width",
            "{width}",
            "--disable-smart-width",
            "{input}",
            "{output}",
        ];
        Self::new(program, args.iter().map(|s| s.to_string()).collect())
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, width: u32, input: &str, output: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| {
                a.replace("{width}", &width.to_string())
                    .replace("{input}", input)
                    .replace("{output}", output)
            })
            .collect()
    }
}

#[async_trait]
impl Rasterizer for CommandRasterizer {
    async fn rasterize(&self, html: &str, width: u32) -> Result<DynamicImage, RasterError> {
        let dir = TempDir::new()?;
        let input: PathBuf = dir.path().join("page.html");
        let output: PathBuf = dir.path().join("page.png");
        tokio::fs::write(&input, html).await?;

        let args = self.expand_args(
            width,
            &input.to_string_lossy(),
            &output.to_string_lossy(),
        );
        debug!("Running {} {:?}", self.program, args);

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| RasterError::Timeout {
                program: self.program.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| RasterError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(RasterError::Exit {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let bytes = tokio::fs::read(&output).await?;
        // PNG decoding is CPU-bound; keep it off the async workers.
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| RasterError::Task(e.to_string()))??;

        info!(
            "Captured {}x{} px with {}",
            image.width(),
            image.height(),
            self.program
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_are_expanded() {
        let r = CommandRasterizer::wkhtmltoimage();
        let args = r.expand_args(750, "/tmp/in.html", "/tmp/out.png");
        assert!(args.contains(&"750".to_string()));
        assert_eq!(args[args.len() - 2], "/tmp/in.html");
        assert_eq!(args[args.len() - 1], "/tmp/out.png");
        assert!(!args.iter().any(|a| a.contains('{')));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let r = CommandRasterizer::with_program("chatshot-no-such-renderer-binary");
        let err = r.rasterize("<html></html>", 750).await.unwrap_err();
        assert!(matches!(err, RasterError::Spawn { .. }), "got: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_is_an_exit_error() {
        let r = CommandRasterizer::new("false", vec![]);
        let err = r.rasterize("<html></html>", 750).await.unwrap_err();
        assert!(matches!(err, RasterError::Exit { .. }), "got: {err}");
    }
}

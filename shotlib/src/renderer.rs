use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to launch renderer: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("renderer exited with {status}: {stderr}")]
    Exited {
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("renderer exited cleanly but produced no output file")]
    MissingOutput,
}

/// Turns a URL into an image file at `output`. Implementations may be slow
/// or hang outright; the worker bounds every invocation with a timeout.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, output: &Path) -> Result<(), RenderError>;
}

/// Renders pages by driving a headless Chromium in screenshot mode.
pub struct ChromeRenderer {
    binary: PathBuf,
    window_size: String,
}

impl ChromeRenderer {
    pub fn new(binary: impl Into<PathBuf>, window_size: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            window_size: window_size.into(),
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str, output: &Path) -> Result<(), RenderError> {
        let result = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg(format!("--window-size={}", self.window_size))
            .arg("--no-sandbox")
            .arg(format!("--screenshot={}", output.display()))
            .arg(url)
            // a hung browser dies with the worker's timeout, not after it
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            return Err(RenderError::Exited {
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        match tokio::fs::try_exists(output).await {
            Ok(true) => Ok(()),
            _ => Err(RenderError::MissingOutput),
        }
    }
}

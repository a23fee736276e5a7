use clap::Parser;
use std::path::PathBuf;

/// Serve the screenshot job API over HTTP.
#[derive(Debug, Parser)]
pub struct ServerConfig {
    /// Address to listen on
    #[clap(long, env = "WEBSHOT_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: String,

    /// Directory screenshots are written into
    #[clap(long, env = "WEBSHOT_ARTIFACT_DIR", default_value = "screenshots")]
    pub artifact_dir: PathBuf,

    /// Maximum renders running at once
    #[clap(long, env = "WEBSHOT_MAX_CONCURRENT_RENDERS", default_value_t = 4)]
    pub max_concurrent_renders: usize,

    /// Hard per-job render bound, in seconds
    #[clap(long, env = "WEBSHOT_RENDER_TIMEOUT_SECS", default_value_t = 30)]
    pub render_timeout_secs: u64,

    /// Headless browser binary used for captures
    #[clap(long, env = "WEBSHOT_CHROME_BIN", default_value = "chromium")]
    pub chrome_bin: PathBuf,

    /// Browser window size, "WIDTH,HEIGHT"
    #[clap(long, env = "WEBSHOT_WINDOW_SIZE", default_value = "1280,720")]
    pub window_size: String,

    /// Public base URL advertised in job records and webhook payloads.
    /// Defaults to http://<listen>.
    #[clap(long, env = "WEBSHOT_BASE_URL")]
    pub base_url: Option<String>,
}

impl ServerConfig {
    pub fn public_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.listen))
    }
}

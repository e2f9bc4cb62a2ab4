use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `api_base_url`.
pub const BASE_URL_ENV: &str = "CLICKPRINT_API_BASE_URL";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_secs: 0.25,
            max_delay_secs: 5,
        }
    }
}

/// Client configuration loaded from `~/.config/clickprint/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend root, e.g. `https://api.example.com`. `/files` and `/jobs` are appended.
    pub api_base_url: String,
    /// TCP/TLS connect timeout for every request.
    pub connect_timeout_secs: u64,
    /// Total timeout for an existence probe (HEAD).
    pub probe_timeout_secs: u64,
    /// Total timeout for an upload or job submission.
    pub upload_timeout_secs: u64,
    /// Files processed concurrently in one batch.
    pub max_concurrent_uploads: usize,
    /// Largest file accepted; the whole file is held in memory between hashing and upload.
    /// An upload in flight holds a second copy for the multipart body, so peak use is
    /// about `2 * max_file_bytes * max_concurrent_uploads`.
    pub max_file_bytes: u64,
    /// Re-probe each uploaded hash and fail the file if the server does not report it.
    #[serde(default)]
    pub verify_after_upload: bool,
    /// Optional path of a file holding the bearer token.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout_secs: 15,
            probe_timeout_secs: 30,
            upload_timeout_secs: 300,
            max_concurrent_uploads: 4,
            max_file_bytes: 64 * 1024 * 1024,
            verify_after_upload: false,
            token_file: None,
            retry: None,
        }
    }
}

impl ClientConfig {
    // curl treats a zero timeout as "no timeout", so every timeout is at least 1s.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs.max(1))
    }

    /// Apply environment overrides (currently only the base URL).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("clickprint")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClientConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ClientConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg.with_env_overrides());
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ClientConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg.with_env_overrides())
}

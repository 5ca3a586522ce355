use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shortest poll interval accepted; smaller values are clamped.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Global configuration loaded from `~/.config/songsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the song server (scheme, host, optional port).
    pub server_url: String,
    /// Path of the song list endpoint, relative to `server_url`.
    pub list_path: String,
    /// Interval between list fetches in milliseconds.
    pub poll_interval_ms: u64,
    /// Connect timeout for every request, in seconds.
    pub connect_timeout_secs: u64,
    /// Total timeout for a list fetch in seconds (None or 0 = wait forever).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Name of the cookie carrying the session id.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

fn default_session_cookie() -> String {
    "uid".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            list_path: "/songs_list".to_string(),
            poll_interval_ms: 2000,
            connect_timeout_secs: 15,
            request_timeout_secs: Some(30),
            session_cookie: default_session_cookie(),
        }
    }
}

impl SyncConfig {
    /// Poll interval, clamped to [`MIN_POLL_INTERVAL_MS`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("songsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: SyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}

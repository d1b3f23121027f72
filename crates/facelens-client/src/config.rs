use crate::error::ClientError;
use facelens_core::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration.
///
/// Resolved as defaults, then the TOML config file (if any), then
/// `FACELENS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the recognition API (default: http://127.0.0.1:8000).
    pub api_url: String,
    /// Records requested per page by list views.
    pub page_size: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Candidates requested per detected face.
    pub top_n: usize,
    /// Height in pixels the detection image is displayed at.
    pub display_height: f32,
    /// UTC offset used to show detection timestamps.
    pub timezone_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            top_n: 10,
            display_height: 400.0,
            timezone_offset_hours: 8,
        }
    }
}

impl Config {
    /// Load from the default config file location and the environment.
    pub fn load() -> Result<Self, ClientError> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text).map_err(|source| ClientError::Config {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Override fields from `FACELENS_*` variables. Unparseable values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FACELENS_API_URL") {
            self.api_url = url;
        }
        self.page_size = env_parse(&lookup, "FACELENS_PAGE_SIZE", self.page_size);
        self.request_timeout_secs =
            env_parse(&lookup, "FACELENS_REQUEST_TIMEOUT_SECS", self.request_timeout_secs);
        self.top_n = env_parse(&lookup, "FACELENS_TOP_N", self.top_n);
        self.display_height = env_parse(&lookup, "FACELENS_DISPLAY_HEIGHT", self.display_height);
        self.timezone_offset_hours =
            env_parse(&lookup, "FACELENS_TIMEZONE_OFFSET_HOURS", self.timezone_offset_hours);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Config file path: `$FACELENS_CONFIG`, else `facelens/config.toml` under
/// `$XDG_CONFIG_HOME` or `~/.config`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("FACELENS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok()?;
    Some(config_dir.join("facelens").join("config.toml"))
}

fn env_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

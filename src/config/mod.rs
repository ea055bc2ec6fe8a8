//! Configuration management for splashfeed.
//!
//! Configuration is read from `~/.config/splashfeed/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod api;
pub mod preferences;

pub use api::{ApiConfig, ImageQuality};
pub use preferences::{PreferenceTable, Preferences};

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::highlight::{
    HighlightWindow, DEFAULT_HIGHLIGHTS_BASE_URL, DEFAULT_HIGHLIGHTS_COUNT,
};
use crate::widget::daemon::parse_interval;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub highlights: HighlightsConfig,
    pub widget: WidgetConfig,
    pub paths: PathsConfig,
    pub preferences: PreferenceTable,
}

/// Daily highlight window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HighlightsConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: usize,
    pub delay_ms: u64,
    pub base_url: String,
}

impl Default for HighlightsConfig {
    fn default() -> Self {
        let window = HighlightWindow::default();
        Self {
            start: window.start,
            end: window.end,
            count: DEFAULT_HIGHLIGHTS_COUNT,
            delay_ms: window.delay.as_millis() as u64,
            base_url: DEFAULT_HIGHLIGHTS_BASE_URL.to_string(),
        }
    }
}

impl HighlightsConfig {
    pub fn window(&self) -> HighlightWindow {
        HighlightWindow {
            start: self.start,
            end: self.end,
            count: self.count,
            delay: Duration::from_millis(self.delay_ms),
            base_url: self.base_url.clone(),
        }
    }
}

/// Widget refresh settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Deadline for downloading the widget image (default: 30)
    pub download_timeout_secs: u64,
    /// Cached files at or below this size are treated as missing (default: 100)
    pub min_cache_kb: u64,
    /// Refresh interval for `widget run`, e.g. "30m", "1h" (default: "1h")
    pub interval: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: 30,
            min_cache_kb: 100,
            interval: "1h".to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn min_cache_bytes(&self) -> u64 {
        self.min_cache_kb.saturating_mul(1024)
    }

    pub fn interval_secs(&self) -> Result<u64, ConfigError> {
        parse_interval(&self.interval).map_err(ConfigError::Invalid)
    }
}

/// Optional overrides for on-disk locations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub database: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/splashfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("splashfeed").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# splashfeed configuration
#
# Image qualities: raw, full, regular, small, thumb
# Intervals: "30m", "1h", "6h", "1d" or plain seconds

[api]
base_url = "https://api.unsplash.com"
# Access key of your API application
client_id = ""
per_page = 10
developer_collection = "1288815"
timeout_secs = 10
browsing_quality = "regular"
download_quality = "full"

[highlights]
# Walks back one day at a time from `start`; dates on or before `end` are skipped
start = "2021-12-31"
end = "2017-03-20"
count = 60
delay_ms = 500
base_url = "https://juniperphoton.dev/myersplash/wallpapers"

[widget]
download_timeout_secs = 30
min_cache_kb = 100
interval = "1h"

[paths]
# database = "/path/to/splashfeed.db"
# cache_dir = "/path/to/cache"
# download_dir = "/path/to/downloads"

[preferences]
show_sponsorship = true
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

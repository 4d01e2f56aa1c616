/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed viewer configuration with defaults
[POS]:    Configuration layer - feed, rendering, and HTTP options
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use logview_adapter::ClientConfig;

/// Top-level configuration for the log viewer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewerConfig {
    /// Feed to open: http(s) URL, file path, `file://` URL, or `-` for stdin
    #[serde(default)]
    pub url: Option<String>,
    /// Height of one record row in terminal rows
    #[serde(default = "default_row_extent")]
    pub row_extent: u64,
    /// Rows materialized beyond each edge of the viewport
    #[serde(default = "default_overscan")]
    pub overscan: u64,
    /// Render loop period; also the fallback batch interval
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Lines retained in the diagnostics log panel
    #[serde(default = "default_log_buffer_capacity")]
    pub log_buffer_capacity: usize,
    /// Stick to the tail of the feed on startup
    #[serde(default = "default_follow")]
    pub follow: bool,
    /// Capture the mouse for wheel scrolling; off keeps terminal text selection
    #[serde(default = "default_mouse_capture")]
    pub mouse_capture: bool,
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP transport options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Total request timeout; unset lets a stream run until the server ends it
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            url: None,
            row_extent: default_row_extent(),
            overscan: default_overscan(),
            frame_interval_ms: default_frame_interval_ms(),
            log_buffer_capacity: default_log_buffer_capacity(),
            follow: default_follow(),
            mouse_capture: default_mouse_capture(),
            http: HttpConfig::default(),
        }
    }
}

fn default_row_extent() -> u64 {
    1
}

fn default_overscan() -> u64 {
    crate::window::DEFAULT_OVERSCAN
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_log_buffer_capacity() -> usize {
    2000
}

fn default_follow() -> bool {
    true
}

fn default_mouse_capture() -> bool {
    true
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl ViewerConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/logview/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logview").join("config.yaml"))
    }

    /// Load the default config file when it exists, defaults otherwise.
    pub fn load_default() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.row_extent > 0, "row_extent must be positive");
        anyhow::ensure!(
            self.frame_interval_ms > 0,
            "frame_interval_ms must be positive"
        );
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.http.timeout_secs.map(Duration::from_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            ..ClientConfig::default()
        }
    }
}

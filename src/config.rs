//! Configuration management for droidtv-remote.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values
//!
//! The `tv` section is also re-read from the file on every status request,
//! so renaming the TV or editing app shortcuts needs no restart.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ServerConfig;
use crate::cli::Args;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Television configuration.
    pub tv: TvSection,
    /// Timeouts.
    pub timeouts: TimeoutSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable graceful shutdown.
    pub graceful_shutdown: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7503,
            graceful_shutdown: true,
        }
    }
}

/// Television configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvSection {
    /// Display name shown in the UI.
    pub name: String,
    /// Address of the television.
    pub ip: String,
    /// App shortcuts shown in the UI.
    pub apps: Vec<AppShortcut>,
    /// Start a (non-forced) connection attempt at startup.
    pub auto_connect: bool,
}

impl Default for TvSection {
    fn default() -> Self {
        Self {
            name: "Android TV".to_string(),
            ip: "127.0.0.1".to_string(),
            apps: Vec::new(),
            auto_connect: true,
        }
    }
}

/// One app launcher button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppShortcut {
    /// Button label.
    pub name: String,
    /// Package name or deep link passed to the TV.
    pub app_id: String,
    /// Optional icon file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Timeout configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSection {
    /// How long to wait for a pairing code, in seconds.
    pub pairing_secs: u64,
    /// How long a long-poll request is held, in seconds.
    pub event_poll_secs: u64,
    /// Pause before a trailing ENTER key, in milliseconds.
    pub enter_delay_ms: u64,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            pairing_secs: 120,
            event_poll_secs: 30,
            enter_delay_ms: 500,
        }
    }
}

impl TimeoutSection {
    pub fn pairing(&self) -> Duration {
        Duration::from_secs(self.pairing_secs)
    }

    pub fn event_poll(&self) -> Duration {
        Duration::from_secs(self.event_poll_secs)
    }

    pub fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// Load configuration from a JSON file without blocking the runtime.
    pub async fn from_file_async(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("DROIDTV_REMOTE_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("DROIDTV_REMOTE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(ip) = std::env::var("DROIDTV_REMOTE_TV_IP") {
            if !ip.is_empty() {
                self.tv.ip = ip;
            }
        }

        if let Ok(level) = std::env::var("DROIDTV_REMOTE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        let mut server_config = ServerConfig::new(host.to_string(), self.server.port);
        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }

        Ok(server_config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Where the HTTP layer reads TV name and app shortcuts from.
///
/// With a file path the `tv` section is re-read on every call; when the
/// file cannot be read the values loaded at startup are used instead.
#[derive(Debug, Clone, Default)]
pub struct TvSource {
    path: Option<PathBuf>,
    fallback: TvSection,
}

impl TvSource {
    /// Always serve the given values.
    pub fn fixed(tv: TvSection) -> Self {
        Self {
            path: None,
            fallback: tv,
        }
    }

    /// Re-read `path` on every call, falling back to `startup`.
    pub fn file(path: impl Into<PathBuf>, startup: TvSection) -> Self {
        Self {
            path: Some(path.into()),
            fallback: startup,
        }
    }

    /// Current TV settings.
    pub async fn current(&self) -> TvSection {
        let Some(path) = &self.path else {
            return self.fallback.clone();
        };
        match Config::from_file_async(path).await {
            Ok(config) => config.tv,
            Err(e) => {
                warn!("Error reloading config from {}: {}", path.display(), e);
                self.fallback.clone()
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
        }
    }
}

impl std::error::Error for ConfigError {}

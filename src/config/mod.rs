//! Configuration management for weekfill
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every section has defaults, so a file only needs
//! the keys it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conflict oracle client
    pub oracle: OracleConfig,

    /// Remote event sources
    pub events: EventsConfig,

    /// Persisted planner state
    pub storage: StorageConfig,

    /// Oracle service
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Conflict oracle client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Conflict endpoint URL
    pub url: String,

    /// Per-check timeout in seconds; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

/// Events API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Base URL serving `/api/events` and `/api/events/scrape`
    pub api_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// State storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the state files
    pub state_dir: PathBuf,
}

/// Oracle service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP server
    pub bind_address: SocketAddr,

    /// Travel estimate between distinct addresses, in minutes
    pub default_travel_minutes: u32,

    /// Enable CORS
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:8080/api/events/conflict"),
            timeout_secs: Some(10),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://localhost:8080"),
            timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("data/state"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            default_travel_minutes: 15,
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

/// Levels accepted by `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Formats accepted by `logging.format`
pub const LOG_FORMATS: [&str; 2] = ["text", "json"];

impl LoggingConfig {
    /// `EnvFilter` directive for the crate's own events at the configured
    /// level; dependencies log at `warn`. `verbose` forces `debug`.
    pub fn filter_directive(&self, verbose: bool) -> String {
        if verbose {
            return String::from("weekfill=debug,info");
        }
        format!("weekfill={},warn", self.level.trim().to_ascii_lowercase())
    }

    /// Output format, with a command-line choice taking priority
    pub fn effective_format<'a>(&'a self, cli_format: Option<&'a str>) -> &'a str {
        cli_format.unwrap_or(self.format.as_str()).trim()
    }

    /// Check if events should be written as JSON
    pub fn is_json(&self, cli_format: Option<&str>) -> bool {
        self.effective_format(cli_format).eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("WEEKFILL_ORACLE_URL") {
            config.oracle.url = url;
        }

        if let Ok(value) = std::env::var("WEEKFILL_ORACLE_TIMEOUT") {
            config.oracle.timeout_secs = match value.trim() {
                "" | "none" | "off" => None,
                secs => Some(
                    secs.parse::<u64>()
                        .with_context(|| format!("Invalid WEEKFILL_ORACLE_TIMEOUT: {secs}"))?,
                ),
            };
        }

        if let Ok(url) = std::env::var("WEEKFILL_EVENTS_API_URL") {
            config.events.api_base_url = url;
        }

        if let Some(secs) = env_parse::<u64>("WEEKFILL_EVENTS_TIMEOUT") {
            config.events.timeout_secs = secs;
        }

        if let Ok(dir) = std::env::var("WEEKFILL_STATE_DIR") {
            config.storage.state_dir = PathBuf::from(dir);
        }

        if let Ok(addr) = std::env::var("WEEKFILL_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .with_context(|| format!("Invalid WEEKFILL_BIND_ADDRESS: {addr}"))?;
        }

        if let Some(minutes) = env_parse::<u32>("WEEKFILL_TRAVEL_MINUTES") {
            config.server.default_travel_minutes = minutes;
        }

        if let Some(enabled) = env_parse::<bool>("WEEKFILL_ENABLE_CORS") {
            config.server.enable_cors = enabled;
        }

        if let Some(enabled) = env_parse::<bool>("WEEKFILL_REQUEST_LOGGING") {
            config.server.enable_request_logging = enabled;
        }

        if let Ok(level) = std::env::var("WEEKFILL_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(format) = std::env::var("WEEKFILL_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.oracle.url)
            .with_context(|| format!("Invalid oracle url: {}", self.oracle.url))?;

        url::Url::parse(&self.events.api_base_url)
            .with_context(|| format!("Invalid events api_base_url: {}", self.events.api_base_url))?;

        if self.oracle.timeout_secs == Some(0) {
            anyhow::bail!("oracle timeout_secs must be greater than 0");
        }

        if self.events.timeout_secs == 0 {
            anyhow::bail!("events timeout_secs must be greater than 0");
        }

        if self.storage.state_dir.as_os_str().is_empty() {
            anyhow::bail!("state_dir must not be empty");
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "Invalid logging level '{}'. Valid options: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        let format = self.logging.format.trim().to_ascii_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            anyhow::bail!(
                "Invalid logging format '{}'. Valid options: {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            );
        }

        Ok(())
    }

    /// Per-check oracle timeout
    #[must_use]
    pub fn oracle_timeout(&self) -> Option<Duration> {
        self.oracle.timeout_secs.map(Duration::from_secs)
    }

    /// Events API request timeout
    #[must_use]
    pub fn events_timeout(&self) -> Duration {
        Duration::from_secs(self.events.timeout_secs)
    }
}

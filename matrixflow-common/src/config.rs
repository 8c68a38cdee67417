use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Notification sink (HTTP) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Base URL of the sink, without a trailing path (e.g. "http://127.0.0.1:8765").
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8765".to_string()
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl SinkConfig {
    /// Check the base URL uses a supported scheme.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "sink base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Check that an address string carries a port (e.g. "127.0.0.1:12345").
pub fn validate_socket_addr(field: &str, addr: &str) -> Result<()> {
    if addr.is_empty() {
        return Err(Error::Config(format!("{} must not be empty", field)));
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(Error::Config(format!(
            "{} '{}' must be host:port (e.g. '127.0.0.1:12345')",
            field, addr
        ))),
    }
}

//! Relay configuration.

use std::path::PathBuf;
use std::time::Duration;

use matrixflow_common::{
    DEFAULT_MATRIX_SIZE, LoggingConfig, SinkConfig, frame_len, validate_matrix_size,
    validate_socket_addr,
};
use matrixflow_framework::{ServiceConfig, ServiceError};
use serde::{Deserialize, Serialize};

/// Complete relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayServiceConfig {
    /// Relay-specific settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Notification sink settings.
    #[serde(default)]
    pub sink: SinkConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener and processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Bind address (e.g., "0.0.0.0:12345").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Pending connection queue length passed to listen(2).
    #[serde(default = "default_backlog")]
    pub backlog: u32,

    /// Edge length of the full matrices producers send.
    #[serde(default = "default_matrix_size")]
    pub matrix_size: usize,

    /// Pause after each connection before accepting the next, in milliseconds.
    #[serde(default = "default_accept_delay_ms")]
    pub accept_delay_ms: u64,

    /// Append-only text log receiving every processed matrix.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_listen() -> String {
    "0.0.0.0:12345".to_string()
}

fn default_backlog() -> u32 {
    3
}

fn default_matrix_size() -> usize {
    DEFAULT_MATRIX_SIZE
}

fn default_accept_delay_ms() -> u64 {
    20
}

fn default_log_file() -> PathBuf {
    PathBuf::from("matrix_log.txt")
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            backlog: default_backlog(),
            matrix_size: default_matrix_size(),
            accept_delay_ms: default_accept_delay_ms(),
            log_file: default_log_file(),
        }
    }
}

impl RelayConfig {
    /// Expected byte length of one frame.
    pub fn frame_len(&self) -> usize {
        frame_len(self.matrix_size)
    }

    /// Pause between connections.
    pub fn accept_delay(&self) -> Duration {
        Duration::from_millis(self.accept_delay_ms)
    }

    /// Validate the relay settings.
    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_socket_addr("relay.listen", &self.listen)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        if self.backlog == 0 {
            return Err(ServiceError::validation("relay.backlog must be at least 1"));
        }

        validate_matrix_size(self.matrix_size)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        if self.log_file.as_os_str().is_empty() {
            return Err(ServiceError::validation("relay.log_file must not be empty"));
        }

        Ok(())
    }
}

impl ServiceConfig for RelayServiceConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<(), ServiceError> {
        self.relay.validate()?;
        self.sink
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: RelayServiceConfig = json5::from_str("{}").unwrap();

        assert_eq!(config.relay.listen, "0.0.0.0:12345");
        assert_eq!(config.relay.backlog, 3);
        assert_eq!(config.relay.matrix_size, 64);
        assert_eq!(config.relay.accept_delay(), Duration::from_millis(20));
        assert_eq!(config.relay.log_file, PathBuf::from("matrix_log.txt"));
        assert_eq!(config.relay.frame_len(), 16384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            relay: {
                listen: "127.0.0.1:9000",
                backlog: 16,
                matrix_size: 128,
                accept_delay_ms: 0,
                log_file: "/var/log/matrixflow/matrices.txt",
            },
            sink: { base_url: "http://localhost:8765" },
            logging: { level: "warn", format: "json" },
        }"#;

        let config: RelayServiceConfig = json5::from_str(json).unwrap();
        assert_eq!(config.relay.listen, "127.0.0.1:9000");
        assert_eq!(config.relay.backlog, 16);
        assert_eq!(config.relay.frame_len(), 128 * 128 * 4);
        assert_eq!(config.relay.accept_delay(), Duration::ZERO);
        assert_eq!(config.sink.base_url, "http://localhost:8765");
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_port() {
        let mut config = RelayServiceConfig::default();
        config.relay.listen = "0.0.0.0".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_matrix_size() {
        let mut config = RelayServiceConfig::default();
        config.relay.matrix_size = 66;
        assert!(matches!(
            config.validate(),
            Err(ServiceError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_validate_zero_backlog() {
        let mut config = RelayServiceConfig::default();
        config.relay.backlog = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_sample_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/relay.json5");
        let config = RelayServiceConfig::load(path).unwrap();

        assert_eq!(config.relay.listen, "0.0.0.0:12345");
        assert_eq!(config.relay.backlog, 3);
    }
}

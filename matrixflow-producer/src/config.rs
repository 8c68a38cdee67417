//! Configuration for the matrix producer.

use std::time::Duration;

use matrixflow_common::{
    DEFAULT_MATRIX_SIZE, LoggingConfig, SinkConfig, validate_matrix_size, validate_socket_addr,
};
use matrixflow_framework::{ServiceConfig, ServiceError};
use serde::{Deserialize, Serialize};

/// Complete producer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProducerServiceConfig {
    /// Producer-specific settings
    #[serde(default)]
    pub producer: ProducerConfig,

    /// Notification sink settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Worker pool and send cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Relay address (host:port)
    #[serde(default = "default_relay_addr")]
    pub relay_addr: String,

    /// Number of parallel workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Frames per second sent by each worker
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Frames each worker sends before closing its connection
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Edge length of generated matrices
    #[serde(default = "default_matrix_size")]
    pub matrix_size: usize,

    /// End the worker when a timestamp cannot be delivered to the sink
    #[serde(default = "default_true")]
    pub stop_on_timestamp_error: bool,
}

fn default_relay_addr() -> String {
    "127.0.0.1:12345".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_rate_hz() -> f64 {
    50.0
}

fn default_iterations() -> u32 {
    50
}

fn default_matrix_size() -> usize {
    DEFAULT_MATRIX_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            relay_addr: default_relay_addr(),
            workers: default_workers(),
            rate_hz: default_rate_hz(),
            iterations: default_iterations(),
            matrix_size: default_matrix_size(),
            stop_on_timestamp_error: true,
        }
    }
}

impl ProducerConfig {
    /// Delay between two sends of one worker.
    ///
    /// A rate too small for its period to be represented waits forever.
    pub fn send_period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.rate_hz).unwrap_or(Duration::MAX)
    }

    /// Validate the producer settings.
    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_socket_addr("producer.relay_addr", &self.relay_addr)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        if self.workers == 0 {
            return Err(ServiceError::validation("producer.workers must be at least 1"));
        }

        let representable = Duration::try_from_secs_f64(1.0 / self.rate_hz).is_ok();
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0 && representable) {
            return Err(ServiceError::validation(format!(
                "producer.rate_hz must be a positive number, got {}",
                self.rate_hz
            )));
        }

        if self.iterations == 0 {
            return Err(ServiceError::validation(
                "producer.iterations must be at least 1",
            ));
        }

        validate_matrix_size(self.matrix_size)
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        Ok(())
    }
}

impl ServiceConfig for ProducerServiceConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<(), ServiceError> {
        self.producer.validate()?;
        self.sink
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: ProducerServiceConfig = json5::from_str("{}").unwrap();

        assert_eq!(config.producer.relay_addr, "127.0.0.1:12345");
        assert_eq!(config.producer.workers, 4);
        assert_eq!(config.producer.rate_hz, 50.0);
        assert_eq!(config.producer.iterations, 50);
        assert_eq!(config.producer.matrix_size, 64);
        assert!(config.producer.stop_on_timestamp_error);
        assert_eq!(config.sink.base_url, "http://127.0.0.1:8765");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            producer: {
                relay_addr: "10.0.0.5:4000",
                workers: 8,
                rate_hz: 10,
                iterations: 5,
                matrix_size: 32,
                stop_on_timestamp_error: false,
            },
            sink: { base_url: "http://ui:8765" },
            logging: { level: "debug" },
        }"#;

        let config: ProducerServiceConfig = json5::from_str(json).unwrap();
        assert_eq!(config.producer.relay_addr, "10.0.0.5:4000");
        assert_eq!(config.producer.workers, 8);
        assert_eq!(config.producer.iterations, 5);
        assert_eq!(config.producer.matrix_size, 32);
        assert!(!config.producer.stop_on_timestamp_error);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases: Vec<fn(&mut ProducerConfig)> = vec![
            |c| c.workers = 0,
            |c| c.rate_hz = 0.0,
            |c| c.rate_hz = f64::NAN,
            |c| c.rate_hz = 1e-310,
            |c| c.iterations = 0,
            |c| c.matrix_size = 30,
            |c| c.relay_addr = "127.0.0.1".to_string(),
        ];

        for mutate in cases {
            let mut config = ProducerConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(ServiceError::ConfigValidation(_))),
                "{:?} should fail validation",
                config
            );
        }
    }

    #[test]
    fn test_send_period() {
        let config = ProducerConfig::default();
        assert_eq!(config.send_period(), Duration::from_millis(20));

        let tiny = ProducerConfig {
            rate_hz: 1e-310,
            ..ProducerConfig::default()
        };
        assert_eq!(tiny.send_period(), Duration::MAX);
    }

    #[test]
    fn test_validate_rejects_bad_sink() {
        let mut config = ProducerServiceConfig::default();
        config.sink.base_url = "ftp://ui".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_sample_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/producer.json5");
        let config = ProducerServiceConfig::load(path).unwrap();

        assert_eq!(config.producer.workers, 4);
        assert_eq!(config.producer.rate_hz, 50.0);
    }
}

//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::LoggingConfig;
use crate::error::{Result, ServiceError};

/// Trait for service configuration types.
///
/// Implement this trait for a service's configuration struct to get
/// JSON5 loading, validation, and access to the logging settings.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use matrixflow_framework::{LoggingConfig, ServiceConfig, ServiceError};
///
/// #[derive(Debug, Default, Deserialize)]
/// pub struct MyServiceConfig {
///     #[serde(default)]
///     pub logging: LoggingConfig,
///     #[serde(default)]
///     pub workers: usize,
/// }
///
/// impl ServiceConfig for MyServiceConfig {
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
///
///     fn validate(&self) -> Result<(), ServiceError> {
///         if self.workers == 0 {
///             return Err(ServiceError::validation("At least one worker required"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait ServiceConfig: Sized + DeserializeOwned {
    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. Override to add custom validation.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ServiceError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise validate and return the defaults.
    fn load_or_default(path: Option<&Path>) -> Result<Self>
    where
        Self: Default,
    {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}

//! Service runner for lifecycle management.

use std::future::Future;

use tokio::signal;
use tokio::task::JoinSet;

use matrixflow_common::{LoggingConfig, init_tracing};

use crate::ServiceArgs;
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};

/// Service runner that manages the lifecycle of a matrixflow binary.
///
/// Handles:
/// - Logging initialization (with optional CLI override)
/// - Task spawning and tracking
/// - Running until every task has finished or Ctrl+C is received
///
/// # Example
///
/// ```ignore
/// use matrixflow_framework::{ServiceArgs, ServiceConfig, ServiceRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = ServiceArgs::parse_for("myservice");
///     let config = MyConfig::load_or_default(args.config.as_deref())?;
///
///     let mut runner = ServiceRunner::new_with_args("myservice", config, Some(&args))?;
///     runner.spawn(async move {
///         // Worker logic here
///     });
///
///     runner.run().await?;
///     Ok(())
/// }
/// ```
pub struct ServiceRunner<C: ServiceConfig> {
    /// Service name for logging.
    name: String,
    /// Service version.
    version: String,
    /// The loaded configuration.
    config: C,
    /// Spawned tasks.
    tasks: JoinSet<()>,
}

impl<C: ServiceConfig> ServiceRunner<C> {
    /// Create a new service runner and initialize logging from the config.
    pub fn new(name: impl Into<String>, config: C) -> Result<Self> {
        Self::new_with_args(name, config, None)
    }

    /// Create a new service runner with CLI args for log level override.
    pub fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&ServiceArgs>,
    ) -> Result<Self> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION").to_string();

        let log_config = match args.and_then(|a| a.log_level.as_ref()) {
            Some(level) => LoggingConfig {
                level: level.clone(),
                format: config.logging().format,
            },
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| ServiceError::config(e.to_string()))?;

        tracing::info!(service = %name, version = %version, "Starting service");

        Ok(Self {
            name,
            version,
            config,
            tasks: JoinSet::new(),
        })
    }

    /// Get the service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the service version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Number of tasks still tracked by the runner.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Spawn a task.
    ///
    /// The task is tracked and aborted on shutdown.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(future);
    }

    /// Spawn a task that returns a Result.
    ///
    /// Errors are logged automatically.
    pub fn spawn_with_error<F, E>(&mut self, name: String, future: F)
    where
        F: Future<Output = std::result::Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.tasks.spawn(async move {
            if let Err(e) = future.await {
                tracing::error!(task = %name, error = %e, "Task failed");
            }
        });
    }

    /// Run until every spawned task has finished or Ctrl+C is received.
    ///
    /// On Ctrl+C the remaining tasks are aborted. If the signal handler
    /// cannot be installed the runner keeps waiting for the tasks.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            service = %self.name,
            tasks = self.tasks.len(),
            "Service running. Press Ctrl+C to stop."
        );

        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut listening = true;

        loop {
            tokio::select! {
                joined = self.tasks.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(e)) => {
                        tracing::warn!(service = %self.name, error = %e, "Task ended abnormally");
                    }
                    None => {
                        tracing::info!(service = %self.name, "All tasks finished");
                        break;
                    }
                },
                result = &mut shutdown, if listening => match result {
                    Ok(()) => {
                        tracing::info!(service = %self.name, "Received shutdown signal");
                        self.tasks.shutdown().await;
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                        listening = false;
                    }
                },
            }
        }

        tracing::info!(service = %self.name, "Goodbye!");

        Ok(())
    }
}

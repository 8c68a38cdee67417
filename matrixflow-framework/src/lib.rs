//! matrixflow Service Framework
//!
//! Common lifecycle plumbing shared by the matrixflow producer and relay binaries.
//!
//! # Overview
//!
//! This framework provides:
//! - [`ServiceConfig`] trait for configuration loading and validation
//! - [`ServiceRunner`] for managing service lifecycle (logging, tasks, shutdown)
//! - [`ServiceArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use matrixflow_framework::{ServiceArgs, ServiceConfig, ServiceRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = ServiceArgs::parse_for("myservice");
//!     let config = MyServiceConfig::load_or_default(args.config.as_deref())?;
//!
//!     let mut runner = ServiceRunner::new_with_args("myservice", config, Some(&args))?;
//!     runner.spawn(my_worker());
//!
//!     // Run until the workers finish or Ctrl+C
//!     runner.run().await?;
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod error;
mod runner;

pub use args::ServiceArgs;
pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use runner::ServiceRunner;

// Re-export commonly used types from matrixflow-common
pub use matrixflow_common::{LogFormat, LoggingConfig, SinkConfig};

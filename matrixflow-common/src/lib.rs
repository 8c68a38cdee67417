//! matrixflow Common Library
//!
//! This crate provides shared types and utilities for the matrixflow producer and relay:
//!
//! - [`matrix`] - Full/mini matrix model and the block-averaging downsampler
//! - [`frame`] - Native-endian binary frame codec
//! - [`sink`] - HTTP notification sink client and payloads
//! - [`timestamp`] - `HH:MM:SS.mmm` wall-clock formatting
//! - [`config`] - Shared configuration sections (sink, logging)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod sink;
pub mod timestamp;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, SinkConfig, validate_socket_addr};
pub use error::{Error, Result};
pub use frame::{CELL_BYTES, decode_frame, encode_frame, frame_len};
pub use matrix::{
    BLOCK_SIZE, CELL_MAX, DEFAULT_MATRIX_SIZE, FullMatrix, Matrix, MiniMatrix,
    validate_matrix_size,
};
pub use sink::{PublishOutcome, SinkClient};
pub use timestamp::{current_timestamp, format_timestamp};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Supports two
/// output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))
}

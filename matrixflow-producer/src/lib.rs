//! Parallel matrix producer for the matrixflow pipeline.
//!
//! Each worker opens one TCP connection to the relay and, for a fixed
//! number of iterations, sends a random full matrix as a raw binary frame
//! and posts the current wall-clock time to the notification sink.
//!
//! ```text
//! worker 0 ──frame──▶ relay        worker 0 ──{"timestamp"}──▶ sink
//! worker 1 ──frame──▶ relay        worker 1 ──{"timestamp"}──▶ sink
//! ...
//! ```

pub mod config;
pub mod metrics;
pub mod pool;
pub mod worker;

pub use config::{ProducerConfig, ProducerServiceConfig};
pub use metrics::ProducerMetrics;
pub use pool::{ProducerPool, WorkerOutcome};
pub use worker::{MatrixWorker, WorkerError, WorkerReport};

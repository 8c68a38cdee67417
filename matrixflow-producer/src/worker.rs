//! Matrix generation and transmission.

use std::io;
use std::sync::Arc;

use matrixflow_common::{CELL_MAX, FullMatrix, SinkClient, current_timestamp, encode_frame};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::config::ProducerConfig;
use crate::metrics::ProducerMetrics;

/// Error type for worker operations.
///
/// Every variant ends the worker; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to connect to relay at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to send matrix: {0}")]
    Send(#[source] io::Error),
    #[error("Failed to send timestamp: {0}")]
    Timestamp(#[source] matrixflow_common::Error),
    #[error("Invalid matrix: {0}")]
    Matrix(#[source] matrixflow_common::Error),
}

/// Summary of a worker that completed all its iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub frames_sent: u32,
    pub timestamps_sent: u32,
}

/// A single producer worker owning one relay connection.
pub struct MatrixWorker {
    id: usize,
    config: ProducerConfig,
    sink: SinkClient,
    metrics: Arc<ProducerMetrics>,
    rng: SmallRng,
}

impl MatrixWorker {
    /// Create a new worker.
    pub fn new(
        id: usize,
        config: ProducerConfig,
        sink: SinkClient,
        metrics: Arc<ProducerMetrics>,
    ) -> Self {
        Self {
            id,
            config,
            sink,
            metrics,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Use a fixed RNG seed, making the generated matrices reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Worker identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Draw a full matrix with every cell independently in `[0, CELL_MAX]`.
    pub fn generate_matrix(&mut self) -> Result<FullMatrix, WorkerError> {
        let size = self.config.matrix_size;
        let cells = (0..size * size)
            .map(|_| self.rng.random_range(0..=CELL_MAX))
            .collect();

        FullMatrix::from_cells(size, cells).map_err(WorkerError::Matrix)
    }

    /// Connect to the relay and run every iteration over that one connection.
    ///
    /// The connection is closed when the iterations are done or on the first
    /// failure. There is no reconnection.
    pub async fn run(mut self) -> Result<WorkerReport, WorkerError> {
        let addr = self.config.relay_addr.clone();

        let mut stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(source) => {
                error!(worker = self.id, relay = %addr, error = %source, "Failed to connect to relay");
                return Err(WorkerError::Connect { addr, source });
            }
        };

        info!(worker = self.id, relay = %addr, "Connected to relay");

        let result = self.send_loop(&mut stream).await;

        if let Err(e) = &result {
            error!(worker = self.id, error = %e, "Worker stopped");
        }

        if let Err(e) = stream.shutdown().await {
            debug!(worker = self.id, error = %e, "Connection shutdown failed");
        }
        info!(worker = self.id, relay = %addr, "Closing connection");

        result
    }

    async fn send_loop(&mut self, stream: &mut TcpStream) -> Result<WorkerReport, WorkerError> {
        let period = self.config.send_period();
        let mut report = WorkerReport {
            worker_id: self.id,
            frames_sent: 0,
            timestamps_sent: 0,
        };

        for iteration in 0..self.config.iterations {
            let matrix = self.generate_matrix()?;
            send_frame(stream, &matrix).await?;

            self.metrics.record_frame_sent();
            report.frames_sent += 1;
            debug!(worker = self.id, iteration, "Matrix sent");

            // Independent of the frame: a delivered frame is not undone if
            // the timestamp fails.
            let timestamp = current_timestamp();
            match self.sink.send_timestamp(&timestamp).await {
                Ok(()) => {
                    self.metrics.record_timestamp_sent();
                    report.timestamps_sent += 1;
                }
                Err(e) if self.config.stop_on_timestamp_error => {
                    return Err(WorkerError::Timestamp(e));
                }
                Err(e) => {
                    warn!(worker = self.id, iteration, error = %e, "Failed to send timestamp");
                }
            }

            tokio::time::sleep(period).await;
        }

        Ok(report)
    }
}

/// Write one whole frame.
///
/// Waits until every byte is queued, like a blocking send. A connection
/// that stops accepting bytes part way through fails the write.
async fn send_frame(stream: &mut TcpStream, matrix: &FullMatrix) -> Result<(), WorkerError> {
    let frame = encode_frame(matrix);
    stream.write_all(&frame).await.map_err(WorkerError::Send)
}

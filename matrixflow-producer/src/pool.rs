//! Fixed-size pool of producer workers.

use std::sync::Arc;

use matrixflow_common::SinkClient;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::ProducerConfig;
use crate::metrics::ProducerMetrics;
use crate::worker::{MatrixWorker, WorkerError, WorkerReport};

/// Outcome of one worker, keyed by worker id.
pub type WorkerOutcome = (usize, Result<WorkerReport, WorkerError>);

/// Starts every worker at once and waits for all of them.
///
/// Workers share the sink client and the metrics but nothing else; one
/// worker failing never stops the others.
pub struct ProducerPool {
    config: ProducerConfig,
    sink: SinkClient,
    metrics: Arc<ProducerMetrics>,
}

impl ProducerPool {
    /// Create a pool for the configured number of workers.
    pub fn new(config: ProducerConfig, sink: SinkClient) -> Self {
        Self {
            config,
            sink,
            metrics: Arc::new(ProducerMetrics::new()),
        }
    }

    /// Shared counters for all workers of this pool.
    pub fn metrics(&self) -> Arc<ProducerMetrics> {
        self.metrics.clone()
    }

    /// Run every worker to completion, returning outcomes ordered by worker id.
    pub async fn run(&self) -> Vec<WorkerOutcome> {
        let mut workers = JoinSet::new();

        for id in 0..self.config.workers {
            let worker = MatrixWorker::new(
                id,
                self.config.clone(),
                self.sink.clone(),
                self.metrics.clone(),
            );
            workers.spawn(async move { (id, worker.run().await) });
        }

        info!(
            workers = self.config.workers,
            relay = %self.config.relay_addr,
            iterations = self.config.iterations,
            rate_hz = self.config.rate_hz,
            "Producer workers started"
        );

        let mut outcomes = Vec::with_capacity(self.config.workers);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((id, Ok(report))) => {
                    info!(
                        worker = id,
                        frames = report.frames_sent,
                        timestamps = report.timestamps_sent,
                        "Worker finished"
                    );
                    outcomes.push((id, Ok(report)));
                }
                Ok((id, Err(e))) => {
                    debug!(worker = id, error = %e, "Worker ended with error");
                    outcomes.push((id, Err(e)));
                }
                Err(e) => {
                    error!(error = %e, "Worker task panicked");
                }
            }
        }

        outcomes.sort_by_key(|(id, _)| *id);

        info!(
            frames_sent = self.metrics.frames_sent(),
            timestamps_sent = self.metrics.timestamps_sent(),
            "All producer workers finished"
        );

        outcomes
    }
}

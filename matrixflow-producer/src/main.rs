//! matrixflow producer.
//!
//! Runs a pool of workers that send random matrices to the relay and
//! timestamps to the notification sink, then exits.

use anyhow::{Context, Result};
use matrixflow_common::SinkClient;
use matrixflow_framework::{ServiceArgs, ServiceConfig, ServiceRunner};
use matrixflow_producer::{ProducerPool, ProducerServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ServiceArgs::parse_for("matrixflow-producer");

    // Load configuration
    let config = ProducerServiceConfig::load_or_default(args.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Create the service runner (initializes logging)
    let mut runner = ServiceRunner::new_with_args("producer", config, Some(&args))?;

    let sink = SinkClient::new(&runner.config().sink).context("Failed to create sink client")?;
    let pool = ProducerPool::new(runner.config().producer.clone(), sink);

    runner.spawn(async move {
        pool.run().await;
    });

    // Returns once every worker has finished
    runner.run().await?;

    Ok(())
}

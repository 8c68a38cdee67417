//! matrixflow relay.
//!
//! Receives matrix frames from producers, downsamples every other one and
//! publishes the pair to the notification sink. Runs until Ctrl+C.

use anyhow::{Context, Result};
use matrixflow_common::SinkClient;
use matrixflow_framework::{ServiceArgs, ServiceConfig, ServiceRunner};
use matrixflow_relay::{MatrixRelay, RelayError, RelayServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ServiceArgs::parse_for("matrixflow-relay");

    // Load configuration
    let config = RelayServiceConfig::load_or_default(args.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Create the service runner (initializes logging)
    let mut runner = ServiceRunner::new_with_args("relay", config, Some(&args))?;

    let sink = SinkClient::new(&runner.config().sink).context("Failed to create sink client")?;
    let relay_config = runner.config().relay.clone();

    tracing::info!(
        listen = %relay_config.listen,
        log_file = %relay_config.log_file.display(),
        sink = %sink.base_url(),
        "Starting relay"
    );

    // A bind failure ends the task and with it the service
    runner.spawn_with_error("relay".to_string(), async move {
        let relay = MatrixRelay::bind(&relay_config, sink).await?;
        relay.run().await;
        Ok::<(), RelayError>(())
    });

    runner.run().await?;

    Ok(())
}

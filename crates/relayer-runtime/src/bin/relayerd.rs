//! # relayerd
//!
//! Bridge relayer daemon.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (metrics registry, tracing subscriber)
//! 2. Load configuration (file named by `RELAYER_CONFIG`, env overrides)
//! 3. Start one relay loop per bridge side
//! 4. Wait for Ctrl+C, then shut down gracefully

use anyhow::{bail, Result};
use std::time::Duration;
use tracing::{debug, info};

use bridge_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use relayer_runtime::{dev_runtime, produce_blocks, RelayerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry)?;
    info!(service = %telemetry.service_name, "Telemetry initialized");

    let config = RelayerConfig::load()?;
    if !config.dev_mode {
        bail!("No ledger backend configured. Set RELAYER_DEV_MODE=true to run against in-memory chains.");
    }

    let block_time = Duration::from_secs(config.bridge.source.poll_interval_secs.max(1));
    let (mut runtime, ledgers) = dev_runtime(config.bridge)?;
    runtime.start()?;
    let producer = tokio::spawn(produce_blocks(ledgers, block_time, runtime.shutdown_signal()));

    info!("Relayer is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    producer.await?;
    debug!("Final metrics:\n{}", encode_metrics()?);

    Ok(())
}

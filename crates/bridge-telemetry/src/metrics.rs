//! Prometheus metrics for the bridge relayer.
//!
//! All metrics follow the naming convention `bridge_<metric>_<unit>` and carry
//! a `chain` label with the chain name.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SCANNING
    // =========================================================================

    /// Ledger event queries issued by the windowed scanner
    pub static ref SCAN_WINDOWS: CounterVec = CounterVec::new(
        Opts::new("bridge_scan_windows_total", "Event query windows issued by the scanner"),
        &["chain", "direction"]  // direction: forward/backward
    ).expect("metric creation failed");

    /// Snapshots decoded from commit events
    pub static ref SNAPSHOTS_RECONCILED: CounterVec = CounterVec::new(
        Opts::new("bridge_snapshots_reconciled_total", "Snapshots decoded from commit events"),
        &["chain"]
    ).expect("metric creation failed");

    // =========================================================================
    // CONFIRMATION
    // =========================================================================

    /// Terminal outcomes of submitted transactions
    pub static ref TX_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("bridge_tx_outcomes_total", "Terminal outcomes of submitted transactions"),
        &["chain", "status"]  // status: confirmed/reverted/expired
    ).expect("metric creation failed");

    /// Receipt blocks found off the canonical chain
    pub static ref FORKS_DETECTED: CounterVec = CounterVec::new(
        Opts::new("bridge_forks_detected_total", "Receipt blocks found off the canonical chain"),
        &["chain"]
    ).expect("metric creation failed");

    // =========================================================================
    // RELAY
    // =========================================================================

    /// Last block persisted by the relay loop
    pub static ref RELAY_CURSOR: GaugeVec = GaugeVec::new(
        Opts::new("bridge_relay_cursor_block", "Last block persisted by the relay loop"),
        &["chain"]
    ).expect("metric creation failed");

    /// Failed relay ticks
    pub static ref RELAY_ERRORS: CounterVec = CounterVec::new(
        Opts::new("bridge_relay_errors_total", "Failed relay ticks"),
        &["chain", "error_type"]  // error_type: transient/decode/invariant/not_found
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Scanning
        Box::new(SCAN_WINDOWS.clone()),
        Box::new(SNAPSHOTS_RECONCILED.clone()),
        // Confirmation
        Box::new(TX_OUTCOMES.clone()),
        Box::new(FORKS_DETECTED.clone()),
        // Relay
        Box::new(RELAY_CURSOR.clone()),
        Box::new(RELAY_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

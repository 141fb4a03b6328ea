//! # Relay Loop
//!
//! Moves one bridge side's records into the store, one confirmed block range
//! per tick.
//!
//! ## Tick
//!
//! ```text
//! from = cursor + 1 (start_block before the first batch)
//! to   = min(head - confirm_depth, from + max_batch_blocks - 1)
//! scan [from, to] -> check snapshot contiguity -> save_batch(cursor = to)
//! ```
//!
//! A failed tick leaves the cursor untouched and is retried after
//! `poll_interval * 2^(failures - 1)`, capped at `max_backoff_secs`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use bridge_telemetry::{RELAY_CURSOR, RELAY_ERRORS};
use bridge_types::{BridgeError, BridgeSnapshot, ChainSide, LedgerReader};

use crate::application::reconciler::SnapshotReconciler;
use crate::config::{BridgeConfig, ChainSideConfig};
use crate::ports::{RootRegistry, SnapshotApi, SnapshotStore, StoreBatch};

/// What one successful tick persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// First block covered.
    pub from: u64,
    /// Last block covered (new cursor).
    pub to: u64,
    /// Records written.
    pub records: usize,
}

/// Delay before the next attempt after `failures` consecutive failures.
pub fn backoff_delay(base: Duration, cap: Duration, failures: u32) -> Duration {
    if failures == 0 {
        return base;
    }
    let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(cap)
}

fn error_type(err: &BridgeError) -> &'static str {
    match err {
        BridgeError::TransientIo(_) => "transient",
        BridgeError::Decode(_) => "decode",
        BridgeError::LeafNotFound(_) | BridgeError::NotFound(_) => "not_found",
        BridgeError::InvariantViolation(_) => "invariant",
    }
}

/// Relay loop for one side.
pub struct RelayLoop<L, R, S>
where
    L: LedgerReader,
    R: RootRegistry,
    S: SnapshotStore,
{
    reconciler: SnapshotReconciler<L, R>,
    ledger: Arc<L>,
    store: Arc<S>,
}

impl<L, R, S> RelayLoop<L, R, S>
where
    L: LedgerReader,
    R: RootRegistry,
    S: SnapshotStore,
{
    /// Relay for `side`.
    pub fn new(
        config: BridgeConfig,
        side: ChainSide,
        ledger: Arc<L>,
        registry: Arc<R>,
        store: Arc<S>,
    ) -> Result<Self, BridgeError> {
        let reconciler = SnapshotReconciler::new(config, side, ledger.clone(), registry)?;
        Ok(Self {
            reconciler,
            ledger,
            store,
        })
    }

    fn side(&self) -> ChainSide {
        self.reconciler.side()
    }

    fn chain(&self) -> &ChainSideConfig {
        self.reconciler.config().side(self.side())
    }

    /// Run one tick. `Ok(None)` when no new confirmed block exists.
    pub async fn tick(&self) -> Result<Option<TickReport>, BridgeError> {
        let chain = self.chain();
        let side = self.side();

        let from = match self.store.cursor(side).await? {
            Some(cursor) => cursor + 1,
            None => chain.start_block,
        };
        let head = self.ledger.head().await?;
        let Some(safe_head) = head.checked_sub(chain.confirm_depth) else {
            return Ok(None);
        };
        if safe_head < from {
            debug!(chain = %chain.chain_name, from, safe_head, "[bridge-sync] nothing confirmed yet");
            return Ok(None);
        }
        let to = safe_head.min(from.saturating_add(chain.max_batch_blocks - 1));

        let mut batch = StoreBatch::empty(side, from, to);
        batch.snapshots = self.reconciler.get_snapshots_by_range(from, to).await?;
        batch.hash_events = self.reconciler.get_hash_events_by_range(from, to).await?;
        batch.bridge_txs = self.reconciler.scan_bridge_txs(from, to).await?;
        batch.token_infos = self.reconciler.get_token_infos_by_range(from, to).await?;
        batch.blocks = self.reconciler.get_block_index(from, to).await?;

        let previous = self.store.last_snapshot(side).await?;
        batch.snapshots = self.contiguous(previous, batch.snapshots)?;

        let records = batch.record_count();
        self.store.save_batch(batch).await?;
        RELAY_CURSOR
            .with_label_values(&[chain.chain_name.as_str()])
            .set(to as f64);
        info!(chain = %chain.chain_name, from, to, records, "[bridge-sync] batch persisted");

        Ok(Some(TickReport { from, to, records }))
    }

    /// Drop genesis and already-persisted roots, then require every remaining
    /// snapshot to start where its predecessor ended.
    fn contiguous(
        &self,
        previous: Option<BridgeSnapshot>,
        snapshots: Vec<BridgeSnapshot>,
    ) -> Result<Vec<BridgeSnapshot>, BridgeError> {
        let genesis = self.reconciler.config().genesis_snapshot();
        let mut prev = previous.unwrap_or_else(|| genesis.clone());
        let mut kept = Vec::with_capacity(snapshots.len());

        for snapshot in snapshots {
            if snapshot.merkle_root == genesis.merkle_root || snapshot.merkle_root == prev.merkle_root {
                continue;
            }
            if !snapshot.follows(&prev) {
                return Err(BridgeError::InvariantViolation(format!(
                    "snapshot {} does not follow {}",
                    bridge_types::hex::hash_to_hex(&snapshot.merkle_root),
                    bridge_types::hex::hash_to_hex(&prev.merkle_root)
                )));
            }
            prev = snapshot.clone();
            kept.push(snapshot);
        }
        Ok(kept)
    }

    /// Tick until `shutdown` turns true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let chain = self.chain();
        let base = Duration::from_secs(chain.poll_interval_secs.max(1));
        let cap = Duration::from_secs(chain.max_backoff_secs).max(base);
        let mut failures: u32 = 0;

        info!(chain = %chain.chain_name, side = %self.side(), "[bridge-sync] relay loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = tokio::select! {
                result = self.tick() => result,
                _ = shutdown.changed() => break,
            };

            let delay = match outcome {
                Ok(_) => {
                    failures = 0;
                    base
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    RELAY_ERRORS
                        .with_label_values(&[chain.chain_name.as_str(), error_type(&e)])
                        .inc();
                    let delay = backoff_delay(base, cap, failures);
                    if e.is_transient() {
                        warn!(chain = %chain.chain_name, failures, ?delay, "[bridge-sync] tick failed: {}", e);
                    } else {
                        error!(chain = %chain.chain_name, failures, ?delay, "[bridge-sync] tick failed: {}", e);
                    }
                    delay
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(chain = %chain.chain_name, "[bridge-sync] relay loop stopped");
    }
}

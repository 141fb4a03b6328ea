//! # Relayer Runtime
//!
//! Owns one relay loop per bridge side and the shared shutdown channel.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Build a `RelayLoop` per side over that side's ledger and root table
//! 3. Spawn both loops
//!
//! ## Shutdown
//!
//! `shutdown()` flips the watch channel and waits for every loop to return.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use bridge_finality::{ConfirmationMonitor, ConfirmationPolicy};
use bridge_sync::adapters::{MemoryLedger, MemoryRegistry, MemoryStore};
use bridge_sync::{BridgeConfig, LedgerReader, RelayLoop, RootRegistry, SnapshotStore};
use bridge_types::ChainSide;

/// Ledger and root table of one chain.
pub struct SideBackend<L, R> {
    /// Chain reader.
    pub ledger: Arc<L>,
    /// Bridge core root table.
    pub registry: Arc<R>,
}

impl<L, R> Clone for SideBackend<L, R> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Runtime wiring both sides to one store.
pub struct RelayerRuntime<L, R, S>
where
    L: LedgerReader + 'static,
    R: RootRegistry + 'static,
    S: SnapshotStore + 'static,
{
    config: BridgeConfig,
    source: SideBackend<L, R>,
    target: SideBackend<L, R>,
    store: Arc<S>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl<L, R, S> RelayerRuntime<L, R, S>
where
    L: LedgerReader + 'static,
    R: RootRegistry + 'static,
    S: SnapshotStore + 'static,
{
    /// Create a runtime. Nothing runs until `start`.
    pub fn new(
        config: BridgeConfig,
        source: SideBackend<L, R>,
        target: SideBackend<L, R>,
        store: Arc<S>,
    ) -> Result<Self> {
        config.validate().context("Invalid bridge configuration")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            source,
            target,
            store,
            shutdown_tx,
            shutdown_rx,
            handles: Vec::new(),
        })
    }

    fn backend(&self, side: ChainSide) -> &SideBackend<L, R> {
        match side {
            ChainSide::Source => &self.source,
            ChainSide::Target => &self.target,
        }
    }

    /// Shared store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Receiver that turns true on shutdown.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Spawn the relay loop of each side.
    pub fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Bridge Relayer v{}", crate::VERSION);
        info!(
            "  {} <-> {}",
            self.config.source.chain_name, self.config.target.chain_name
        );
        info!("===========================================");

        for side in ChainSide::ALL {
            let backend = self.backend(side).clone();
            let relay = RelayLoop::new(
                self.config.clone(),
                side,
                backend.ledger,
                backend.registry,
                Arc::clone(&self.store),
            )
            .with_context(|| format!("Failed to build {side} relay loop"))?;
            let shutdown = self.shutdown_rx.clone();
            self.handles.push(tokio::spawn(async move {
                relay.run(shutdown).await;
            }));
        }

        info!("Relay loops started");
        Ok(())
    }

    /// Confirmation monitor for transactions sent to `side`.
    pub fn monitor(&self, side: ChainSide) -> Result<ConfirmationMonitor<L>> {
        let chain = self.config.side(side);
        let policy = ConfirmationPolicy::new(
            chain.confirm_depth,
            chain.expire_depth,
            Duration::from_secs(chain.poll_interval_secs.max(1)),
        )?;
        Ok(ConfirmationMonitor::new(
            chain.chain_name.clone(),
            side,
            policy,
            Arc::clone(&self.backend(side).ledger),
        )?)
    }

    /// Signal shutdown and wait for the loops.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Relay task failed: {}", e);
            }
        }
        info!("Shutdown complete");
    }
}

/// In-memory chains for dev mode.
pub type DevRuntime = RelayerRuntime<MemoryLedger, MemoryRegistry, MemoryStore>;

/// Dev-mode runtime plus handles on its in-memory ledgers.
pub fn dev_runtime(config: BridgeConfig) -> Result<(DevRuntime, [Arc<MemoryLedger>; 2])> {
    let source = SideBackend {
        ledger: Arc::new(MemoryLedger::new(&config.source.chain_name)),
        registry: Arc::new(MemoryRegistry::new()),
    };
    let target = SideBackend {
        ledger: Arc::new(MemoryLedger::new(&config.target.chain_name)),
        registry: Arc::new(MemoryRegistry::new()),
    };
    let ledgers = [Arc::clone(&source.ledger), Arc::clone(&target.ledger)];
    let runtime = RelayerRuntime::new(config, source, target, Arc::new(MemoryStore::new()))?;
    Ok((runtime, ledgers))
}

/// Produce one block per `interval` on every dev ledger until shutdown.
pub async fn produce_blocks(
    ledgers: [Arc<MemoryLedger>; 2],
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                for ledger in &ledgers {
                    ledger.advance(1);
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

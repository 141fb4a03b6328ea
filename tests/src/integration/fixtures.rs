//! Shared harness: both bridge sides backed by in-memory adapters.

use std::sync::Arc;

use bridge_crypto::encode_range_args;
use bridge_sync::adapters::{MemoryLedger, MemoryRegistry, MemoryStore};
use bridge_sync::algorithms::{address_topic, u256_word};
use bridge_sync::{BridgeConfig, ChainSideConfig, SnapshotReconciler};
use bridge_types::{Address, BridgeError, BridgeSnapshot, ChainSide, Hash, LedgerEvent, U256};

/// Fields of an emitted swap.
#[derive(Clone, Debug)]
pub struct SwapSpec {
    /// Token contract.
    pub token: Address,
    /// Sender on this chain.
    pub from: Address,
    /// Recipient on the other chain.
    pub recipient: Address,
    /// Gross amount.
    pub amount: u64,
    /// Relayer reward taken from the amount.
    pub reward: u64,
    /// Sender's swap counter.
    pub swap_count: u64,
}

/// One chain with its root table.
pub struct ChainFixture {
    /// Chain settings.
    pub config: ChainSideConfig,
    /// In-memory chain.
    pub ledger: Arc<MemoryLedger>,
    /// Bridge core root table.
    pub registry: Arc<MemoryRegistry>,
}

impl ChainFixture {
    fn new(config: ChainSideConfig) -> Self {
        Self {
            ledger: Arc::new(MemoryLedger::new(&config.chain_name)),
            registry: Arc::new(MemoryRegistry::new()),
            config,
        }
    }

    /// Emit a submit-hash event.
    pub fn submit_hash(&self, app_id: Hash, sender: Address, hash: Hash, block: u64) -> LedgerEvent {
        self.ledger.emit(
            self.config.contracts.bridge_core,
            vec![self.config.signatures.submit_hash, app_id, address_topic(&sender)],
            hash.to_vec(),
            block,
        )
    }

    /// Emit a swap event.
    pub fn swap(&self, swap: &SwapSpec, block: u64) -> LedgerEvent {
        let data = [
            u256_word(U256::from(swap.amount)),
            u256_word(U256::from(swap.reward)),
            u256_word(U256::from(swap.swap_count)),
        ]
        .concat();
        self.ledger.emit(
            self.config.contracts.ft_bridge,
            vec![
                self.config.signatures.swap,
                address_topic(&swap.token),
                address_topic(&swap.from),
                address_topic(&swap.recipient),
            ],
            data,
            block,
        )
    }

    /// Emit a claim event.
    pub fn claim(&self, token: Address, recipient: Address, amount: u64, block: u64) -> LedgerEvent {
        self.ledger.emit(
            self.config.contracts.ft_bridge,
            vec![self.config.signatures.claim, address_topic(&token), address_topic(&recipient)],
            u256_word(U256::from(amount)).to_vec(),
            block,
        )
    }

    /// Emit a commit event and record the root in the table.
    pub fn commit(&self, snapshot: &BridgeSnapshot, block: u64) -> LedgerEvent {
        self.registry.push(snapshot.merkle_root, &snapshot.chains);
        self.ledger.emit(
            self.config.contracts.bridge_core,
            vec![self.config.signatures.commit, snapshot.merkle_root],
            encode_range_args(&snapshot.chains),
            block,
        )
    }
}

/// Both bridge sides plus a shared store.
pub struct BridgeHarness {
    /// Bridge settings.
    pub config: BridgeConfig,
    /// Source chain.
    pub source: ChainFixture,
    /// Target chain.
    pub target: ChainFixture,
    /// Shared store.
    pub store: Arc<MemoryStore>,
}

impl BridgeHarness {
    /// Harness over `BridgeConfig::for_testing()`.
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::for_testing())
    }

    /// Harness over an explicit config.
    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            source: ChainFixture::new(config.source.clone()),
            target: ChainFixture::new(config.target.clone()),
            store: Arc::new(MemoryStore::new()),
            config,
        }
    }

    /// Chain on `side`.
    pub fn chain(&self, side: ChainSide) -> &ChainFixture {
        match side {
            ChainSide::Source => &self.source,
            ChainSide::Target => &self.target,
        }
    }

    /// Reconciler reading `side`.
    pub fn reconciler(
        &self,
        side: ChainSide,
    ) -> Result<SnapshotReconciler<MemoryLedger, MemoryRegistry>, BridgeError> {
        let chain = self.chain(side);
        SnapshotReconciler::new(
            self.config.clone(),
            side,
            Arc::clone(&chain.ledger),
            Arc::clone(&chain.registry),
        )
    }
}

impl Default for BridgeHarness {
    fn default() -> Self {
        Self::new()
    }
}

//! In-memory `SnapshotStore` keyed by deterministic ids.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use bridge_crypto::{check_bridge_tx, hash_event_id};
use bridge_types::{
    BlockIndex, BridgeError, BridgeSnapshot, BridgeTx, ChainSide, Hash, HashEvent, TokenInfo,
};

use crate::ports::{SnapshotStore, StoreBatch};

#[derive(Default)]
struct StoreState {
    cursors: HashMap<ChainSide, u64>,
    snapshots: HashMap<ChainSide, Vec<BridgeSnapshot>>,
    hash_events: HashMap<Hash, HashEvent>,
    bridge_txs: HashMap<Hash, BridgeTx>,
    token_infos: HashMap<Hash, TokenInfo>,
    blocks: BTreeMap<(String, u64), BlockIndex>,
    batches: usize,
}

/// Store backed by maps; a batch is applied under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    should_fail: RwLock<bool>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write while set.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write() = fail;
    }

    /// Snapshots persisted from `side`, in save order.
    pub fn snapshots(&self, side: ChainSide) -> Vec<BridgeSnapshot> {
        self.state.read().snapshots.get(&side).cloned().unwrap_or_default()
    }

    /// All hash events, ordered by block and index.
    pub fn hash_events(&self) -> Vec<HashEvent> {
        let mut events: Vec<_> = self.state.read().hash_events.values().cloned().collect();
        events.sort_by_key(|e| (e.chain_name.clone(), e.block_number, e.log_index));
        events
    }

    /// All bridge transactions, ordered by block and index.
    pub fn bridge_txs(&self) -> Vec<BridgeTx> {
        let mut txs: Vec<_> = self.state.read().bridge_txs.values().cloned().collect();
        txs.sort_by_key(|t| (t.base.chain_name.clone(), t.base.block_number, t.base.log_index));
        txs
    }

    /// Latest registration per token, ordered by chain and token address.
    pub fn token_infos(&self) -> Vec<TokenInfo> {
        let mut infos: Vec<_> = self.state.read().token_infos.values().cloned().collect();
        infos.sort_by_key(|t| (t.chain_name.clone(), t.token_addr));
        infos
    }

    /// Block index entries of one chain, ascending.
    pub fn blocks(&self, chain_name: &str) -> Vec<BlockIndex> {
        self.state
            .read()
            .blocks
            .values()
            .filter(|b| b.chain_name == chain_name)
            .cloned()
            .collect()
    }

    /// Number of batches applied.
    pub fn batches_saved(&self) -> usize {
        self.state.read().batches
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn cursor(&self, side: ChainSide) -> Result<Option<u64>, BridgeError> {
        Ok(self.state.read().cursors.get(&side).copied())
    }

    async fn last_snapshot(&self, side: ChainSide) -> Result<Option<BridgeSnapshot>, BridgeError> {
        Ok(self
            .state
            .read()
            .snapshots
            .get(&side)
            .and_then(|s| s.last().cloned()))
    }

    async fn save_batch(&self, batch: StoreBatch) -> Result<(), BridgeError> {
        if *self.should_fail.read() {
            return Err(BridgeError::TransientIo("store unavailable".into()));
        }
        for tx in &batch.bridge_txs {
            check_bridge_tx(tx)?;
        }
        let mut state = self.state.write();

        let saved = state.snapshots.entry(batch.side).or_default();
        for snapshot in batch.snapshots {
            if !saved.iter().any(|s| s.merkle_root == snapshot.merkle_root) {
                saved.push(snapshot);
            }
        }
        for event in batch.hash_events {
            state.hash_events.insert(hash_event_id(&event), event);
        }
        for tx in batch.bridge_txs {
            state.bridge_txs.insert(tx.bridge_tx_id, tx);
        }
        for info in batch.token_infos {
            let newer = state
                .token_infos
                .get(&info.token_id)
                .map_or(true, |known| known.update_block_num <= info.update_block_num);
            if newer {
                state.token_infos.insert(info.token_id, info);
            }
        }
        for block in batch.blocks {
            state.blocks.insert((block.chain_name.clone(), block.block_num), block);
        }
        state.cursors.insert(batch.side, batch.to);
        state.batches += 1;
        Ok(())
    }
}

//! # Inbound Ports
//!
//! Query API over one side's bridge contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bridge_types::{BlockIndex, BridgeError, BridgeSnapshot, BridgeTx, Hash, HashEvent, TokenInfo};

/// Most recent committed snapshot and where it was committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    /// The snapshot (genesis when nothing was committed yet).
    pub snapshot: BridgeSnapshot,
    /// Committing transaction; `None` for genesis.
    pub txid: Option<Hash>,
    /// Committing block; 0 for genesis.
    pub block_number: u64,
}

/// Snapshot located by root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSnapshot {
    /// Position in the root table (0 for genesis).
    pub index: u64,
    /// The snapshot.
    pub snapshot: BridgeSnapshot,
}

/// Read-side bridge API.
#[async_trait]
pub trait SnapshotApi: Send + Sync {
    /// Latest committed snapshot, falling back to genesis.
    async fn get_latest_snapshot(&self) -> Result<LatestSnapshot, BridgeError>;

    /// Snapshot at a root-table index.
    async fn get_snapshot_by_index(&self, index: u64) -> Result<BridgeSnapshot, BridgeError>;

    /// Snapshot by root value.
    async fn get_snapshot_by_root(&self, root: &Hash) -> Result<IndexedSnapshot, BridgeError>;

    /// Number of committed roots.
    async fn get_root_count(&self) -> Result<u64, BridgeError>;

    /// Snapshots committed in `[begin, end]`, ascending.
    async fn get_snapshots_by_range(&self, begin: u64, end: u64) -> Result<Vec<BridgeSnapshot>, BridgeError>;

    /// Hash events submitted in `[begin, end]`, ascending.
    async fn get_hash_events_by_range(&self, begin: u64, end: u64) -> Result<Vec<HashEvent>, BridgeError>;

    /// Swaps and claims in `[begin, end]`, ascending.
    async fn scan_bridge_txs(&self, begin: u64, end: u64) -> Result<Vec<BridgeTx>, BridgeError>;

    /// Token registration updates in `[begin, end]`, ascending.
    async fn get_token_infos_by_range(&self, begin: u64, end: u64) -> Result<Vec<TokenInfo>, BridgeError>;

    /// One entry per block in `[begin, end]`, stopping at the first missing block.
    async fn get_block_index(&self, begin: u64, end: u64) -> Result<Vec<BlockIndex>, BridgeError>;
}

//! # Outbound Ports
//!
//! Traits for external dependencies: the on-chain root table, the relational
//! store and the signing key. The ledger reader lives in `bridge-types`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bridge_types::{
    BlockIndex, BridgeError, BridgeSnapshot, BridgeTx, ChainSide, Hash, HashEvent, TokenInfo,
};

pub use bridge_types::LedgerReader;

/// Entry of the on-chain root table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootInfo {
    /// Position in the table; 0 means the root is unknown.
    pub index: u64,
    /// RLP range arguments recorded with the root.
    pub args: Vec<u8>,
}

/// Read access to the bridge core contract's root table.
#[async_trait]
pub trait RootRegistry: Send + Sync {
    /// Number of roots recorded so far.
    async fn root_count(&self) -> Result<u64, BridgeError>;

    /// Root at `index`; `ZERO_ROOT` when the slot is empty.
    async fn root_at(&self, index: u64) -> Result<Hash, BridgeError>;

    /// Table entry for `root`; `index == 0` when the root is unknown.
    async fn root_info(&self, root: &Hash) -> Result<RootInfo, BridgeError>;
}

/// Everything one relay tick persists for one side, written atomically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreBatch {
    /// Side the batch was scanned from.
    pub side: ChainSide,
    /// First block covered.
    pub from: u64,
    /// Last block covered; becomes the side's cursor.
    pub to: u64,
    /// Snapshots committed in `[from, to]`, ascending.
    pub snapshots: Vec<BridgeSnapshot>,
    /// Submitted hashes.
    pub hash_events: Vec<HashEvent>,
    /// Swaps and claims.
    pub bridge_txs: Vec<BridgeTx>,
    /// Token registration updates.
    pub token_infos: Vec<TokenInfo>,
    /// Observed blocks.
    pub blocks: Vec<BlockIndex>,
}

impl StoreBatch {
    /// Batch covering `[from, to]` with no records yet.
    pub fn empty(side: ChainSide, from: u64, to: u64) -> Self {
        Self {
            side,
            from,
            to,
            snapshots: Vec::new(),
            hash_events: Vec::new(),
            bridge_txs: Vec::new(),
            token_infos: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Number of records carried.
    pub fn record_count(&self) -> usize {
        self.snapshots.len()
            + self.hash_events.len()
            + self.bridge_txs.len()
            + self.token_infos.len()
            + self.blocks.len()
    }
}

/// Persistence boundary. Writes are idempotent by deterministic ids.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Last block persisted for `side`; `None` before the first batch.
    async fn cursor(&self, side: ChainSide) -> Result<Option<u64>, BridgeError>;

    /// Most recent snapshot persisted from `side`.
    async fn last_snapshot(&self, side: ChainSide) -> Result<Option<BridgeSnapshot>, BridgeError>;

    /// Persist a batch and advance the side's cursor to `batch.to`. A batch
    /// holding an inconsistent bridge tx is rejected whole.
    async fn save_batch(&self, batch: StoreBatch) -> Result<(), BridgeError>;
}

/// Validator signing key. Wallet management stays outside this crate.
pub trait Signer: Send + Sync {
    /// Signature over a 32-byte digest.
    fn sign(&self, digest: &Hash) -> Result<Vec<u8>, BridgeError>;
}

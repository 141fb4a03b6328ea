//! # Bridge Entities
//!
//! Value types moved between the scanner, the reconciler, the Merkle engine
//! and the store.
//!
//! ## Clusters
//!
//! - **Commitments**: `ChainRange`, `BridgeSnapshot`
//! - **Bridge activity**: `BridgeTx` (swap / claim), `HashEvent`
//! - **Indexing**: `TokenInfo`, `BlockIndex`

use serde::{Deserialize, Serialize};
use std::fmt;

pub use primitive_types::U256;

use crate::errors::{Address, BridgeError, Hash, ZERO_ROOT};

// =============================================================================
// COMMITMENTS
// =============================================================================

/// Which side of the bridge a chain sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainSide {
    /// Source chain (first range of every snapshot).
    Source,
    /// Target chain (second range of every snapshot).
    Target,
}

impl ChainSide {
    /// Position of this side's range inside `BridgeSnapshot::chains`.
    pub fn index(self) -> usize {
        match self {
            ChainSide::Source => 0,
            ChainSide::Target => 1,
        }
    }

    /// The other side of the bridge.
    pub fn counterpart(self) -> ChainSide {
        match self {
            ChainSide::Source => ChainSide::Target,
            ChainSide::Target => ChainSide::Source,
        }
    }

    /// Both sides in snapshot order.
    pub const ALL: [ChainSide; 2] = [ChainSide::Source, ChainSide::Target];
}

impl fmt::Display for ChainSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSide::Source => write!(f, "source"),
            ChainSide::Target => write!(f, "target"),
        }
    }
}

/// Half-open block interval `[begin_block_num, end_block_num)` on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRange {
    /// Human-readable chain name (e.g. "ethereum").
    pub chain_name: String,
    /// Chain identifier as a string (network id or genesis id).
    pub chain_id: String,
    /// First block covered.
    pub begin_block_num: u64,
    /// First block not covered.
    pub end_block_num: u64,
}

impl ChainRange {
    /// Create a range, rejecting `begin > end`.
    pub fn new(
        chain_name: impl Into<String>,
        chain_id: impl Into<String>,
        begin_block_num: u64,
        end_block_num: u64,
    ) -> Result<Self, BridgeError> {
        if begin_block_num > end_block_num {
            return Err(BridgeError::InvariantViolation(format!(
                "chain range begin {begin_block_num} > end {end_block_num}"
            )));
        }
        Ok(Self {
            chain_name: chain_name.into(),
            chain_id: chain_id.into(),
            begin_block_num,
            end_block_num,
        })
    }

    /// Empty range anchored at `block` (used by the genesis snapshot).
    pub fn empty_at(chain_name: impl Into<String>, chain_id: impl Into<String>, block: u64) -> Self {
        Self {
            chain_name: chain_name.into(),
            chain_id: chain_id.into(),
            begin_block_num: block,
            end_block_num: block,
        }
    }

    /// Same chain (name compared case-insensitively).
    pub fn same_chain(&self, other: &ChainRange) -> bool {
        self.chain_name.eq_ignore_ascii_case(&other.chain_name) && self.chain_id == other.chain_id
    }

    /// Number of blocks covered.
    pub fn len(&self) -> u64 {
        self.end_block_num - self.begin_block_num
    }

    /// True for `[n, n)`.
    pub fn is_empty(&self) -> bool {
        self.begin_block_num == self.end_block_num
    }
}

/// One agreed commitment over both bridge sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    /// Merkle root over the snapshot's canonical leaf set.
    pub merkle_root: Hash,
    /// Exactly two ranges: `[source, target]`.
    pub chains: [ChainRange; 2],
}

impl BridgeSnapshot {
    /// Create a snapshot, validating both ranges.
    pub fn new(merkle_root: Hash, source: ChainRange, target: ChainRange) -> Result<Self, BridgeError> {
        for range in [&source, &target] {
            if range.begin_block_num > range.end_block_num {
                return Err(BridgeError::InvariantViolation(format!(
                    "{} range begin {} > end {}",
                    range.chain_name, range.begin_block_num, range.end_block_num
                )));
            }
        }
        Ok(Self {
            merkle_root,
            chains: [source, target],
        })
    }

    /// Range for one bridge side.
    pub fn range(&self, side: ChainSide) -> &ChainRange {
        &self.chains[side.index()]
    }

    /// True when the root is the zero root.
    pub fn is_zero(&self) -> bool {
        self.merkle_root == ZERO_ROOT
    }

    /// Whether `self` directly succeeds `prev` on both sides (`next.begin == prev.end`).
    pub fn follows(&self, prev: &BridgeSnapshot) -> bool {
        self.chains.iter().zip(prev.chains.iter()).all(|(next, prev)| {
            next.same_chain(prev) && next.begin_block_num == prev.end_block_num
        })
    }
}

// =============================================================================
// BRIDGE ACTIVITY
// =============================================================================

/// Fields shared by swap and claim records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBase {
    /// Chain name.
    pub chain_name: String,
    /// Chain id.
    pub chain_id: String,
    /// Block height of the emitting event.
    pub block_number: u64,
    /// Block id of the emitting event.
    pub block_id: Hash,
    /// Transaction id.
    pub txid: Hash,
    /// Event position used to disambiguate several events in one transaction.
    pub log_index: u32,
    /// Token contract.
    pub token: Address,
    /// Gross amount.
    pub amount: U256,
    /// Block timestamp.
    pub timestamp: u64,
    /// Receiving account.
    pub recipient: Address,
}

/// Swap-only fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDetails {
    /// Cross-chain correlation key referenced by the far-side claim.
    pub swap_tx_hash: Hash,
    /// Sending account.
    pub from: Address,
    /// Relayer reward withheld from `amount`.
    pub reward: U256,
    /// Net amount released on the far side.
    pub amount_out: U256,
    /// Per-account swap sequence number.
    pub swap_count: U256,
}

/// Swap or claim discriminator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeTxKind {
    /// Funds locked on this chain.
    Swap(SwapDetails),
    /// Funds released on this chain.
    Claim,
}

/// A decoded bridge transaction. Built only through the constructors in
/// `bridge_crypto::records`, which derive `bridge_tx_id` and `swap_tx_hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTx {
    /// Deterministic primary key.
    pub bridge_tx_id: Hash,
    /// Common fields.
    #[serde(flatten)]
    pub base: TxBase,
    /// Swap / claim payload.
    pub kind: BridgeTxKind,
}

impl BridgeTx {
    /// Numeric kind code used by the store (1 = swap, 2 = claim).
    pub fn kind_code(&self) -> u8 {
        match self.kind {
            BridgeTxKind::Swap(_) => 1,
            BridgeTxKind::Claim => 2,
        }
    }

    /// Swap correlation key, if this is a swap.
    pub fn swap_tx_hash(&self) -> Option<Hash> {
        match &self.kind {
            BridgeTxKind::Swap(details) => Some(details.swap_tx_hash),
            BridgeTxKind::Claim => None,
        }
    }
}

/// An application-level commitment submitted on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEvent {
    /// Chain name.
    pub chain_name: String,
    /// Chain id.
    pub chain_id: String,
    /// Block height.
    pub block_number: u64,
    /// Block id.
    pub block_id: Hash,
    /// Transaction id.
    pub txid: Hash,
    /// Event position.
    pub log_index: u32,
    /// Block timestamp.
    pub timestamp: u64,
    /// Submitting application.
    pub app_id: Hash,
    /// Submitting account.
    pub sender: Address,
    /// Committed hash.
    pub hash: Hash,
}

// =============================================================================
// INDEXING
// =============================================================================

/// Bridged token registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Derived identifier.
    pub token_id: Hash,
    pub chain_name: String,
    pub chain_id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub token_addr: Address,
    pub native_coin: bool,
    pub token_type: u8,
    pub target_token_addr: Address,
    pub target_chain_name: String,
    pub target_chain_id: String,
    /// First block the mapping is active.
    pub begin: u64,
    /// Last block the mapping is active (0 = open ended).
    pub end: u64,
    pub reward: u64,
    pub update_block_num: u64,
    pub update_block_id: Hash,
}

/// One observed block, recorded so the store can detect reorganizations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndex {
    pub chain_name: String,
    pub chain_id: String,
    pub block_id: Hash,
    pub block_num: u64,
    pub timestamp: u64,
}

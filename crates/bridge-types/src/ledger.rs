//! # Ledger Reader Port
//!
//! Read-only view of one chain. Every scanning and confirmation algorithm is
//! written once against this trait and instantiated per chain side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{Address, BridgeError, Hash};

/// Block header subset needed for fork detection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block id.
    pub id: Hash,
    /// Parent block id.
    pub parent_id: Hash,
    /// Height.
    pub number: u64,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
}

/// Lookup key for `LedgerReader::block`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockRef {
    /// By height on the canonical chain.
    Number(u64),
    /// By block id.
    Id(Hash),
}

/// Transaction receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// False when the transaction reverted.
    pub success: bool,
    /// Inclusion height.
    pub block_number: u64,
    /// Inclusion block id.
    pub block_id: Hash,
}

/// One contract log entry with its block context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Emitting contract.
    pub address: Address,
    /// `topics[0]` is the event signature.
    pub topics: Vec<Hash>,
    /// Non-indexed payload.
    pub data: Vec<u8>,
    pub block_number: u64,
    pub block_id: Hash,
    pub txid: Hash,
    /// Position inside the block (or clause on clause-based chains).
    pub log_index: u32,
    pub timestamp: u64,
}

/// Token contract metadata (`name()`, `symbol()`, `decimals()`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Sort direction for event queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Order {
    /// Lowest block first.
    #[default]
    Asc,
    /// Highest block first.
    Desc,
}

/// Address + signature filter. Empty lists match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Emitting contracts.
    pub addresses: Vec<Address>,
    /// Accepted `topics[0]` values.
    pub topics0: Vec<Hash>,
}

impl EventFilter {
    /// Filter on one contract and one event signature.
    pub fn new(address: Address, topic0: Hash) -> Self {
        Self {
            addresses: vec![address],
            topics0: vec![topic0],
        }
    }

    /// Filter on one contract and several event signatures.
    pub fn with_topics(address: Address, topics0: Vec<Hash>) -> Self {
        Self {
            addresses: vec![address],
            topics0,
        }
    }

    /// Whether `event` passes this filter.
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let address_ok = self.addresses.is_empty() || self.addresses.contains(&event.address);
        let topic_ok = self.topics0.is_empty()
            || event
                .topics
                .first()
                .map(|t| self.topics0.contains(t))
                .unwrap_or(false);
        address_ok && topic_ok
    }
}

/// Read access to one chain.
///
/// Implementations map transport failures to `BridgeError::TransientIo`.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Current best height.
    async fn head(&self) -> Result<u64, BridgeError>;

    /// Block by height or id; `None` when unknown.
    async fn block(&self, at: BlockRef) -> Result<Option<Block>, BridgeError>;

    /// Events matching `filter` in the inclusive block range `[from, to]`.
    async fn events(
        &self,
        filter: &EventFilter,
        from: u64,
        to: u64,
        order: Order,
    ) -> Result<Vec<LedgerEvent>, BridgeError>;

    /// Receipt for `txid`; `None` while the transaction is not included.
    async fn receipt(&self, txid: &Hash) -> Result<Option<Receipt>, BridgeError>;

    /// Metadata of the token contract at `token`; `None` when the address is
    /// not a token contract.
    async fn token_metadata(&self, token: &Address) -> Result<Option<TokenMetadata>, BridgeError>;
}

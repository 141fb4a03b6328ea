//! In-memory `LedgerReader` with deterministic block ids, event injection,
//! reorgs and a log of every event query.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use bridge_crypto::keccak256;
use bridge_types::{
    Address, Block, BlockRef, BridgeError, EventFilter, Hash, LedgerEvent, LedgerReader, Order,
    Receipt, TokenMetadata, ZERO_ROOT,
};

const GENESIS_TIMESTAMP: u64 = 1_600_000_000;
const BLOCK_INTERVAL: u64 = 10;

struct LedgerState {
    /// Canonical chain; index == block number.
    canonical: Vec<Block>,
    /// Every block ever produced, orphans included.
    known: HashMap<Hash, Block>,
    events: Vec<LedgerEvent>,
    receipts: HashMap<Hash, Receipt>,
    tokens: HashMap<Address, TokenMetadata>,
    event_queries: Vec<(u64, u64, Order)>,
    fail_events_from: Option<u64>,
    offline: bool,
    fork: u64,
    tx_nonce: u64,
}

/// In-memory chain.
pub struct MemoryLedger {
    chain: String,
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    /// Chain holding only block 0.
    pub fn new(chain: &str) -> Self {
        let ledger = Self {
            chain: chain.to_string(),
            state: RwLock::new(LedgerState {
                canonical: Vec::new(),
                known: HashMap::new(),
                events: Vec::new(),
                receipts: HashMap::new(),
                tokens: HashMap::new(),
                event_queries: Vec::new(),
                fail_events_from: None,
                offline: false,
                fork: 0,
                tx_nonce: 0,
            }),
        };
        ledger.extend_to(0);
        ledger
    }

    fn block_id(&self, number: u64, fork: u64) -> Hash {
        let mut preimage = self.chain.as_bytes().to_vec();
        preimage.extend_from_slice(&number.to_be_bytes());
        preimage.extend_from_slice(&fork.to_be_bytes());
        keccak256(&preimage)
    }

    fn push_block(&self, state: &mut LedgerState) {
        let number = state.canonical.len() as u64;
        let parent_id = state.canonical.last().map(|b| b.id).unwrap_or(ZERO_ROOT);
        let block = Block {
            id: self.block_id(number, state.fork),
            parent_id,
            number,
            timestamp: GENESIS_TIMESTAMP + number * BLOCK_INTERVAL,
        };
        state.known.insert(block.id, block.clone());
        state.canonical.push(block);
    }

    /// Produce blocks until the head is `height`.
    pub fn extend_to(&self, height: u64) {
        let mut state = self.state.write();
        while (state.canonical.len() as u64) <= height {
            self.push_block(&mut state);
        }
    }

    /// Produce `count` more blocks.
    pub fn advance(&self, count: u64) {
        let height = self.current_head() + count;
        self.extend_to(height);
    }

    /// Current head height.
    pub fn current_head(&self) -> u64 {
        (self.state.read().canonical.len() as u64).saturating_sub(1)
    }

    /// Canonical block at `number`.
    pub fn canonical_block(&self, number: u64) -> Option<Block> {
        self.state.read().canonical.get(number as usize).cloned()
    }

    /// Emit a log in canonical block `block_number` (produced if missing)
    /// inside a fresh transaction.
    pub fn emit(&self, address: Address, topics: Vec<Hash>, data: Vec<u8>, block_number: u64) -> LedgerEvent {
        self.extend_to(block_number);
        let mut state = self.state.write();
        state.tx_nonce += 1;
        let mut preimage = b"tx".to_vec();
        preimage.extend_from_slice(self.chain.as_bytes());
        preimage.extend_from_slice(&state.tx_nonce.to_be_bytes());
        let txid = keccak256(&preimage);

        let block = state.canonical[block_number as usize].clone();
        let log_index = state
            .events
            .iter()
            .filter(|e| e.block_id == block.id)
            .count() as u32;
        let event = LedgerEvent {
            address,
            topics,
            data,
            block_number,
            block_id: block.id,
            txid,
            log_index,
            timestamp: block.timestamp,
        };
        state.events.push(event.clone());
        event
    }

    /// Record a receipt for `txid` in canonical block `block_number`.
    pub fn include_tx(&self, txid: Hash, block_number: u64, success: bool) -> Receipt {
        self.extend_to(block_number);
        let mut state = self.state.write();
        let receipt = Receipt {
            success,
            block_number,
            block_id: state.canonical[block_number as usize].id,
        };
        state.receipts.insert(txid, receipt.clone());
        receipt
    }

    /// Deploy a token contract at `address`.
    pub fn register_token(&self, address: Address, name: &str, symbol: &str, decimals: u8) {
        self.state.write().tokens.insert(
            address,
            TokenMetadata {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }

    /// Replace every block from `height` upward with a new branch of the same
    /// length. Old blocks stay resolvable by id; their events are dropped.
    pub fn reorg_from(&self, height: u64) {
        let mut state = self.state.write();
        let head = state.canonical.len() as u64;
        if height == 0 || height >= head {
            return;
        }
        state.fork += 1;
        state.canonical.truncate(height as usize);
        state.events.retain(|e| e.block_number < height);
        while (state.canonical.len() as u64) < head {
            self.push_block(&mut state);
        }
    }

    /// Fail every ledger call with `TransientIo` while set.
    pub fn set_offline(&self, offline: bool) {
        self.state.write().offline = offline;
    }

    /// Fail event queries whose range reaches `block` or beyond.
    pub fn fail_events_from(&self, block: u64) {
        self.state.write().fail_events_from = Some(block);
    }

    /// Stop failing event queries.
    pub fn clear_failures(&self) {
        self.state.write().fail_events_from = None;
    }

    /// Every event query issued so far as `(from, to, order)`.
    pub fn event_queries(&self) -> Vec<(u64, u64, Order)> {
        self.state.read().event_queries.clone()
    }

    /// Forget recorded queries.
    pub fn clear_queries(&self) {
        self.state.write().event_queries.clear();
    }

    fn check_online(&self) -> Result<(), BridgeError> {
        if self.state.read().offline {
            return Err(BridgeError::TransientIo(format!("{} ledger offline", self.chain)));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn head(&self) -> Result<u64, BridgeError> {
        self.check_online()?;
        Ok(self.current_head())
    }

    async fn block(&self, at: BlockRef) -> Result<Option<Block>, BridgeError> {
        self.check_online()?;
        let state = self.state.read();
        Ok(match at {
            BlockRef::Number(n) => state.canonical.get(n as usize).cloned(),
            BlockRef::Id(id) => state.known.get(&id).cloned(),
        })
    }

    async fn events(
        &self,
        filter: &EventFilter,
        from: u64,
        to: u64,
        order: Order,
    ) -> Result<Vec<LedgerEvent>, BridgeError> {
        self.check_online()?;
        let mut state = self.state.write();
        state.event_queries.push((from, to, order));
        if state.fail_events_from.is_some_and(|block| to >= block) {
            return Err(BridgeError::TransientIo(format!(
                "{} event query [{from}, {to}] timed out",
                self.chain
            )));
        }

        let mut events: Vec<LedgerEvent> = state
            .events
            .iter()
            .filter(|e| e.block_number >= from && e.block_number <= to && filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.block_number, e.log_index));
        if order == Order::Desc {
            events.reverse();
        }
        Ok(events)
    }

    async fn receipt(&self, txid: &Hash) -> Result<Option<Receipt>, BridgeError> {
        self.check_online()?;
        Ok(self.state.read().receipts.get(txid).cloned())
    }

    async fn token_metadata(&self, token: &Address) -> Result<Option<TokenMetadata>, BridgeError> {
        self.check_online()?;
        Ok(self.state.read().tokens.get(token).cloned())
    }
}

//! # Event Decoders
//!
//! Raw ledger logs to bridge records.
//!
//! | Event | Topics | Data |
//! |-------|--------|------|
//! | commit | `[sig, root]` | RLP range args |
//! | submit hash | `[sig, app_id, sender]` | `hash(32)` |
//! | swap | `[sig, token, from, recipient]` | `amount(32) ‖ reward(32) ‖ swap_count(32)` |
//! | claim | `[sig, token, recipient]` | `amount(32)` |
//! | token updated | `[sig, token]` | `native ‖ type ‖ target_token ‖ begin ‖ end ‖ reward` (32 each) |
//!
//! Addresses in topics are left-padded to 32 bytes.

use bridge_crypto::{
    decode_range_args, new_claim_tx, new_swap_tx, token_info_id, RangeArgs, SwapParams,
};
use bridge_types::hex::topic_to_address;
use bridge_types::{
    Address, BridgeError, BridgeTx, Hash, HashEvent, LedgerEvent, TokenInfo, TokenMetadata, TxBase,
    U256,
};

use crate::config::{ChainSideConfig, EventSignatures};

fn topic(event: &LedgerEvent, index: usize, what: &str) -> Result<Hash, BridgeError> {
    event.topics.get(index).copied().ok_or_else(|| {
        BridgeError::Decode(format!(
            "{what}: expected topic {index}, event has {} topics",
            event.topics.len()
        ))
    })
}

fn word(event: &LedgerEvent, index: usize, what: &str) -> Result<U256, BridgeError> {
    let start = index * 32;
    event
        .data
        .get(start..start + 32)
        .map(U256::from_big_endian)
        .ok_or_else(|| {
            BridgeError::Decode(format!(
                "{what}: expected data word {index}, data is {} bytes",
                event.data.len()
            ))
        })
}

fn small_word<T: TryFrom<u64>>(event: &LedgerEvent, index: usize, what: &str) -> Result<T, BridgeError> {
    let value = word(event, index, what)?;
    if value > U256::from(u64::MAX) {
        return Err(BridgeError::Decode(format!("{what}: data word {index} overflows: {value}")));
    }
    T::try_from(value.low_u64())
        .map_err(|_| BridgeError::Decode(format!("{what}: data word {index} out of range: {value}")))
}

/// Commit event to `(root, range args)`.
pub fn decode_commit(event: &LedgerEvent) -> Result<(Hash, RangeArgs), BridgeError> {
    let root = topic(event, 1, "commit")?;
    let args = decode_range_args(&event.data)?;
    Ok((root, args))
}

/// Submit-hash event. `index` is the event's position among submit-hash
/// events of its block.
pub fn decode_submit_hash(
    chain: &ChainSideConfig,
    event: &LedgerEvent,
    index: u32,
) -> Result<HashEvent, BridgeError> {
    let app_id = topic(event, 1, "submit hash")?;
    let sender = topic(event, 2, "submit hash")?;
    let hash: Hash = event
        .data
        .get(..32)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            BridgeError::Decode(format!(
                "submit hash: data is {} bytes, expected 32",
                event.data.len()
            ))
        })?;

    Ok(HashEvent {
        chain_name: chain.chain_name.clone(),
        chain_id: chain.chain_id.clone(),
        block_number: event.block_number,
        block_id: event.block_id,
        txid: event.txid,
        log_index: index,
        timestamp: event.timestamp,
        app_id,
        sender: topic_to_address(&sender),
        hash,
    })
}

fn tx_base(
    chain: &ChainSideConfig,
    event: &LedgerEvent,
    index: u32,
    token: &Hash,
    recipient: &Hash,
    amount: U256,
) -> TxBase {
    TxBase {
        chain_name: chain.chain_name.clone(),
        chain_id: chain.chain_id.clone(),
        block_number: event.block_number,
        block_id: event.block_id,
        txid: event.txid,
        log_index: index,
        token: topic_to_address(token),
        amount,
        timestamp: event.timestamp,
        recipient: topic_to_address(recipient),
    }
}

/// Swap event. `amount_out = amount - reward`; a reward above the amount is
/// an `InvariantViolation`.
pub fn decode_swap(
    chain: &ChainSideConfig,
    event: &LedgerEvent,
    index: u32,
) -> Result<BridgeTx, BridgeError> {
    let token = topic(event, 1, "swap")?;
    let from = topic(event, 2, "swap")?;
    let recipient = topic(event, 3, "swap")?;
    let amount = word(event, 0, "swap")?;
    let reward = word(event, 1, "swap")?;
    let swap_count = word(event, 2, "swap")?;

    let amount_out = amount.checked_sub(reward).ok_or_else(|| {
        BridgeError::InvariantViolation(format!("swap reward {reward} exceeds amount {amount}"))
    })?;

    new_swap_tx(
        tx_base(chain, event, index, &token, &recipient, amount),
        SwapParams {
            from: topic_to_address(&from),
            reward,
            amount_out,
            swap_count,
        },
    )
}

/// Claim event.
pub fn decode_claim(
    chain: &ChainSideConfig,
    event: &LedgerEvent,
    index: u32,
) -> Result<BridgeTx, BridgeError> {
    let token = topic(event, 1, "claim")?;
    let recipient = topic(event, 2, "claim")?;
    let amount = word(event, 0, "claim")?;
    Ok(new_claim_tx(tx_base(chain, event, index, &token, &recipient, amount)))
}

/// Swap or claim, dispatched on `topics[0]`. Other signatures yield `None`.
pub fn decode_bridge_tx(
    chain: &ChainSideConfig,
    signatures: &EventSignatures,
    event: &LedgerEvent,
    index: u32,
) -> Result<Option<BridgeTx>, BridgeError> {
    match event.topics.first() {
        Some(sig) if *sig == signatures.swap => decode_swap(chain, event, index).map(Some),
        Some(sig) if *sig == signatures.claim => decode_claim(chain, event, index).map(Some),
        _ => Ok(None),
    }
}

/// Token registration update. `chain` emitted the event, `counterpart` is
/// the chain the token maps to, `metadata` was read from the token contract.
pub fn decode_token_updated(
    chain: &ChainSideConfig,
    counterpart: &ChainSideConfig,
    event: &LedgerEvent,
    metadata: TokenMetadata,
) -> Result<TokenInfo, BridgeError> {
    let token = topic(event, 1, "token updated")?;
    let native = word(event, 0, "token updated")?;
    let token_type = small_word::<u8>(event, 1, "token updated")?;
    let target_token = word(event, 2, "token updated")?;

    let mut info = TokenInfo {
        token_id: [0u8; 32],
        chain_name: chain.chain_name.clone(),
        chain_id: chain.chain_id.clone(),
        name: metadata.name,
        symbol: metadata.symbol,
        decimals: metadata.decimals,
        token_addr: topic_to_address(&token),
        native_coin: !native.is_zero(),
        token_type,
        target_token_addr: topic_to_address(&u256_word(target_token)),
        target_chain_name: counterpart.chain_name.clone(),
        target_chain_id: counterpart.chain_id.clone(),
        begin: small_word(event, 3, "token updated")?,
        end: small_word(event, 4, "token updated")?,
        reward: small_word(event, 5, "token updated")?,
        update_block_num: event.block_number,
        update_block_id: event.block_id,
    };
    info.token_id = token_info_id(&info);
    Ok(info)
}

/// Per-block event counter; resets whenever the block id changes.
#[derive(Debug, Default)]
pub struct BlockEventIndex {
    block_id: Option<Hash>,
    next: u32,
}

impl BlockEventIndex {
    /// Index for the next event, given the block it belongs to.
    pub fn next(&mut self, block_id: &Hash) -> u32 {
        if self.block_id.as_ref() != Some(block_id) {
            self.block_id = Some(*block_id);
            self.next = 0;
        }
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Topic encoding of an address (left-padded to 32 bytes).
pub fn address_topic(address: &Address) -> Hash {
    let mut topic = [0u8; 32];
    topic[12..].copy_from_slice(address);
    topic
}

/// 32-byte big-endian word.
pub fn u256_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

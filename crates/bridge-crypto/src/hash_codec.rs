//! # Hash Codec
//!
//! Byte-exact Keccak-256 encodings for every derived identifier.
//!
//! ## Encodings
//!
//! | Identifier | Preimage |
//! |------------|----------|
//! | chain range commitment | per chain, sorted: `name ‖ id ‖ minBE(begin) ‖ minBE(end)` |
//! | bridge tx id | `name ‖ id ‖ block_id ‖ txid ‖ minBE(log_index)` |
//! | swap tx hash | `name ‖ id ‖ recipient ‖ token ‖ BE32(amount_out) ‖ BE32(swap_count)` |
//! | leaf | `app_id ‖ inner` |
//! | hash event id | `lower(name) ‖ lower(id) ‖ block_id ‖ txid ‖ minBE(log_index)` |
//! | token id | `lower(name) ‖ lower(id) ‖ lower(address)` |
//!
//! `minBE` is the minimal big-endian encoding: zero encodes as no bytes.

use sha3::{Digest, Keccak256};

use bridge_types::hex::parse_hash;
use bridge_types::{BridgeError, ChainRange, Hash, HashEvent, TxBase, U256};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 of `left ‖ right`.
pub fn hash_concat(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Minimal big-endian bytes of `value`; zero yields an empty vector.
pub fn minimal_be(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// 32-byte big-endian encoding of a 256-bit value.
pub fn be32(value: &U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Canonical commitment over a set of chain ranges.
///
/// Ranges are ordered by lowercase chain name, then chain id, so the result
/// does not depend on input order.
pub fn chain_range_commitment(chains: &[ChainRange]) -> Hash {
    let mut sorted: Vec<&ChainRange> = chains.iter().collect();
    sorted.sort_by(|l, r| {
        l.chain_name
            .to_lowercase()
            .cmp(&r.chain_name.to_lowercase())
            .then_with(|| l.chain_id.cmp(&r.chain_id))
    });

    let mut encoded = Vec::new();
    for chain in sorted {
        encoded.extend_from_slice(chain.chain_name.as_bytes());
        encoded.extend_from_slice(chain.chain_id.as_bytes());
        encoded.extend_from_slice(&minimal_be(chain.begin_block_num));
        encoded.extend_from_slice(&minimal_be(chain.end_block_num));
    }
    keccak256(&encoded)
}

/// Primary key of a swap or claim record.
pub fn bridge_tx_id(base: &TxBase) -> Hash {
    let mut encoded = Vec::new();
    encoded.extend_from_slice(base.chain_name.as_bytes());
    encoded.extend_from_slice(base.chain_id.as_bytes());
    encoded.extend_from_slice(&base.block_id);
    encoded.extend_from_slice(&base.txid);
    encoded.extend_from_slice(&minimal_be(u64::from(base.log_index)));
    keccak256(&encoded)
}

/// Cross-chain correlation key of a swap.
pub fn swap_tx_hash(base: &TxBase, amount_out: &U256, swap_count: &U256) -> Hash {
    let mut encoded = Vec::new();
    encoded.extend_from_slice(base.chain_name.as_bytes());
    encoded.extend_from_slice(base.chain_id.as_bytes());
    encoded.extend_from_slice(&base.recipient);
    encoded.extend_from_slice(&base.token);
    encoded.extend_from_slice(&be32(amount_out));
    encoded.extend_from_slice(&be32(swap_count));
    keccak256(&encoded)
}

/// Merkle leaf for one application hash.
pub fn leaf_hash(app_id: &Hash, inner: &Hash) -> Hash {
    hash_concat(app_id, inner)
}

/// `leaf_hash` over untrusted hex strings.
pub fn leaf_hash_hex(app_id: &str, inner: &str) -> Result<Hash, BridgeError> {
    Ok(leaf_hash(&parse_hash(app_id)?, &parse_hash(inner)?))
}

/// Deterministic id of a submitted hash event.
pub fn hash_event_id(event: &HashEvent) -> Hash {
    let mut encoded = Vec::new();
    encoded.extend_from_slice(event.chain_name.to_lowercase().as_bytes());
    encoded.extend_from_slice(event.chain_id.to_lowercase().as_bytes());
    encoded.extend_from_slice(&event.block_id);
    encoded.extend_from_slice(&event.txid);
    encoded.extend_from_slice(&minimal_be(u64::from(event.log_index)));
    keccak256(&encoded)
}

/// Token identifier over the lowercase textual forms.
pub fn token_id(chain_name: &str, chain_id: &str, address: &str) -> Hash {
    let mut encoded = Vec::new();
    encoded.extend_from_slice(chain_name.to_lowercase().as_bytes());
    encoded.extend_from_slice(chain_id.to_lowercase().as_bytes());
    encoded.extend_from_slice(address.to_lowercase().as_bytes());
    keccak256(&encoded)
}

/// Digest a validator signs to approve `operation` on `root`.
pub fn sign_payload(operation: &str, root: &Hash) -> Hash {
    let mut encoded = Vec::with_capacity(operation.len() + 32);
    encoded.extend_from_slice(operation.as_bytes());
    encoded.extend_from_slice(root);
    keccak256(&encoded)
}

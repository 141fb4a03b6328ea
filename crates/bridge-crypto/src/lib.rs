//! # Bridge Crypto
//!
//! Deterministic commitments for the bridge relayer.
//!
//! ## Modules
//!
//! - `hash_codec`: Keccak-256 preimage encodings for every derived identifier
//! - `merkle`: snapshot tree build / prove / verify
//! - `range_codec`: RLP codec for commit range arguments
//! - `records`: constructors deriving swap / claim identifiers
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_crypto::{chain_range_commitment, merkle, leaf_hash};
//!
//! let leaves = merkle::snapshot_leaves(chain_range_commitment(&chains), event_leaves);
//! let tree = merkle::build(&leaves);
//! let proof = tree.proof(&leaves[1])?;
//! assert!(merkle::verify(&leaves[1], &tree.root(), &proof));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod hash_codec;
pub mod merkle;
pub mod range_codec;
pub mod records;

pub use hash_codec::{
    bridge_tx_id, chain_range_commitment, hash_event_id, keccak256, leaf_hash, leaf_hash_hex,
    sign_payload, swap_tx_hash, token_id,
};
pub use merkle::{MerkleTree, Position, ProofNode};
pub use range_codec::{decode_range_args, encode_range_args, RangeArgs};
pub use records::{check_bridge_tx, new_claim_tx, new_swap_tx, token_info_id, SwapParams};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

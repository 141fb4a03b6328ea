//! # Bridge Errors
//!
//! Error taxonomy shared by every bridge crate.
//!
//! | Variant | Meaning | Caller action |
//! |---------|---------|---------------|
//! | `TransientIo` | ledger or store unreachable | retry with backoff |
//! | `Decode` | malformed payload or hex | abort, surface |
//! | `LeafNotFound` / `NotFound` | expected negative result | handle |
//! | `InvariantViolation` | inconsistent record | reject |

use thiserror::Error;

use crate::hex::hash_to_hex;

/// 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// 20-byte account / contract address.
pub type Address = [u8; 20];

/// The "no commitment yet" root, also the parent of the genesis snapshot.
pub const ZERO_ROOT: Hash = [0u8; 32];

/// Bridge error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Ledger or store unreachable. Never swallowed by the core.
    #[error("Transient I/O error: {0}")]
    TransientIo(String),

    /// Malformed event payload, hex string or RLP item.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Leaf absent from the Merkle tree.
    #[error("Leaf not found: {}", hash_to_hex(.0))]
    LeafNotFound(Hash),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record violates a cross-field invariant.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl BridgeError {
    /// Whether the orchestration layer should retry the failed operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::TransientIo(_))
    }
}

/// Result alias used across the bridge crates.
pub type BridgeResult<T> = Result<T, BridgeError>;

//! Validator approvals signed over `keccak(operation ‖ root)`.
//!
//! | Operation | Root | Submitted as |
//! |-----------|------|--------------|
//! | `updateBridgeMerkleRoot` | new snapshot root | root update |
//! | `lockBridge` | last committed root (zero root allowed) | bridge lock before a snapshot |

use serde::{Deserialize, Serialize};
use tracing::info;

use bridge_crypto::sign_payload;
use bridge_types::hex::{hash_to_hex, serde_hex};
use bridge_types::{BridgeError, BridgeSnapshot, Hash};

use crate::ports::Signer;

/// Operation tag for approving a new merkle root.
pub const UPDATE_ROOT_OPERATION: &str = "updateBridgeMerkleRoot";

/// Operation tag for locking the bridge on its last root.
pub const LOCK_BRIDGE_OPERATION: &str = "lockBridge";

/// Signed approval, ready to submit to the bridge head contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootApproval {
    /// Approved root.
    #[serde(with = "serde_hex")]
    pub root: Hash,
    /// `keccak(operation ‖ root)`.
    #[serde(with = "serde_hex")]
    pub digest: Hash,
    /// Signer output over `digest`.
    pub signature: Vec<u8>,
}

/// Sign `operation` on `root`.
pub fn approve_root<S: Signer + ?Sized>(
    signer: &S,
    operation: &str,
    root: &Hash,
) -> Result<RootApproval, BridgeError> {
    let digest = sign_payload(operation, root);
    let signature = signer.sign(&digest)?;
    info!(root = %hash_to_hex(root), operation, "[bridge-sync] root approved");
    Ok(RootApproval {
        root: *root,
        digest,
        signature,
    })
}

/// Approve a snapshot's root update. Genesis-like zero roots are refused.
pub fn approve_snapshot<S: Signer + ?Sized>(
    signer: &S,
    snapshot: &BridgeSnapshot,
) -> Result<RootApproval, BridgeError> {
    if snapshot.is_zero() {
        return Err(BridgeError::InvariantViolation("refusing to approve the zero root".into()));
    }
    approve_root(signer, UPDATE_ROOT_OPERATION, &snapshot.merkle_root)
}

/// Approve locking the bridge at `last_root`, which is `ZERO_ROOT` before
/// the first commit.
pub fn approve_lock<S: Signer + ?Sized>(
    signer: &S,
    last_root: &Hash,
) -> Result<RootApproval, BridgeError> {
    approve_root(signer, LOCK_BRIDGE_OPERATION, last_root)
}

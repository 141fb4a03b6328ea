//! Confirmation state machine.
//!
//! ```text
//!              ┌──→ Confirmed   receipt success, depth >= confirm_depth, not forked
//! Pending ─────┼──→ Reverted    receipt failure, depth >= confirm_depth, not forked
//!              └──→ Expired     no receipt, head - block_ref > expire_depth
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use bridge_types::hex::serde_hex;
use bridge_types::{BridgeError, ChainSide, Hash, Receipt};

/// Lifecycle state of a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Not yet final either way.
    Pending,
    /// Successful and buried under `confirm_depth` blocks.
    Confirmed,
    /// Failed and buried under `confirm_depth` blocks.
    Reverted,
    /// No receipt within `expire_depth` blocks of submission.
    Expired,
}

impl TxStatus {
    /// Confirmed, reverted and expired are final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TxStatus::Pending)
    }

    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Reverted => "reverted",
            TxStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Depth and polling policy of one chain side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Blocks on top of the receipt block before it is final.
    pub confirm_depth: u64,
    /// Blocks after submission before a missing receipt means expired.
    pub expire_depth: u64,
    /// Delay between polls.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirm_depth: 12,
            expire_depth: 180,
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl ConfirmationPolicy {
    /// Policy from explicit values.
    pub fn new(confirm_depth: u64, expire_depth: u64, poll_interval: Duration) -> Result<Self, BridgeError> {
        let policy = Self {
            confirm_depth,
            expire_depth,
            poll_interval,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Shallow depths and a short poll for tests.
    pub fn for_testing() -> Self {
        Self {
            confirm_depth: 3,
            expire_depth: 6,
            poll_interval: Duration::from_millis(10),
        }
    }

    /// `expire_depth` must not be below `confirm_depth`.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.expire_depth < self.confirm_depth {
            return Err(BridgeError::InvariantViolation(format!(
                "expire_depth {} < confirm_depth {}",
                self.expire_depth, self.confirm_depth
            )));
        }
        Ok(())
    }
}

/// A submitted transaction being tracked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRecord {
    /// Transaction id.
    #[serde(with = "serde_hex")]
    pub txid: Hash,
    /// Head height when tracking started.
    pub block_ref: u64,
    /// Chain the transaction was sent to.
    pub chain_side: ChainSide,
}

/// Result of `confirm_tx`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Reached a terminal status.
    Final(TxStatus),
    /// Shutdown requested before a terminal status.
    Cancelled,
}

/// Classify a transaction at head `head`. `forked` reports whether the
/// receipt block left the canonical chain; it is ignored without a receipt.
pub fn evaluate(
    policy: &ConfirmationPolicy,
    head: u64,
    block_ref: u64,
    receipt: Option<&Receipt>,
    forked: bool,
) -> TxStatus {
    match receipt {
        Some(receipt) if head.saturating_sub(receipt.block_number) >= policy.confirm_depth => {
            if forked {
                TxStatus::Pending
            } else if receipt.success {
                TxStatus::Confirmed
            } else {
                TxStatus::Reverted
            }
        }
        Some(_) => TxStatus::Pending,
        None if head.saturating_sub(block_ref) > policy.expire_depth => TxStatus::Expired,
        None => TxStatus::Pending,
    }
}

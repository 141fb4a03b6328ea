//! # Confirmation Monitor
//!
//! Polls one chain for a submitted transaction's receipt until the
//! transaction is confirmed, reverted or expired.
//!
//! ## Fork check
//!
//! A receipt block counts as canonical when the chain still holds it at its
//! height and each of its next `confirm_depth` ancestors matches the parent id
//! recorded by its child. A missing block or a mismatch means forked; block 0
//! ends the walk.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use bridge_telemetry::{FORKS_DETECTED, TX_OUTCOMES};
use bridge_types::hex::hash_to_hex;
use bridge_types::{BlockRef, BridgeError, ChainSide, Hash, LedgerReader};

use crate::domain::{evaluate, ConfirmationOutcome, ConfirmationPolicy, ConfirmationRecord, TxStatus};

/// Confirmation tracking against one chain.
pub struct ConfirmationMonitor<L>
where
    L: LedgerReader,
{
    chain_name: String,
    side: ChainSide,
    policy: ConfirmationPolicy,
    ledger: Arc<L>,
}

impl<L> ConfirmationMonitor<L>
where
    L: LedgerReader,
{
    /// Monitor for the chain on `side`.
    pub fn new(
        chain_name: impl Into<String>,
        side: ChainSide,
        policy: ConfirmationPolicy,
        ledger: Arc<L>,
    ) -> Result<Self, BridgeError> {
        policy.validate()?;
        Ok(Self {
            chain_name: chain_name.into(),
            side,
            policy,
            ledger,
        })
    }

    /// Active policy.
    pub fn policy(&self) -> &ConfirmationPolicy {
        &self.policy
    }

    /// Start tracking `txid` with the current head as `block_ref`.
    pub async fn track(&self, txid: Hash) -> Result<ConfirmationRecord, BridgeError> {
        let block_ref = self.ledger.head().await?;
        debug!(chain = %self.chain_name, txid = %hash_to_hex(&txid), block_ref, "[bridge-finality] tracking");
        Ok(ConfirmationRecord {
            txid,
            block_ref,
            chain_side: self.side,
        })
    }

    /// Status of `record` at the current head.
    pub async fn check_tx_status(&self, record: &ConfirmationRecord) -> Result<TxStatus, BridgeError> {
        let head = self.ledger.head().await?;
        let receipt = self.ledger.receipt(&record.txid).await?;

        let forked = match &receipt {
            Some(r) if head.saturating_sub(r.block_number) >= self.policy.confirm_depth => {
                self.is_forked(&r.block_id).await?
            }
            _ => false,
        };
        if forked {
            FORKS_DETECTED.with_label_values(&[self.chain_name.as_str()]).inc();
            warn!(
                chain = %self.chain_name,
                txid = %hash_to_hex(&record.txid),
                "[bridge-finality] receipt block is off the canonical chain"
            );
        }

        Ok(evaluate(&self.policy, head, record.block_ref, receipt.as_ref(), forked))
    }

    /// Fork check with the policy's confirmation depth.
    pub async fn is_forked(&self, block_id: &Hash) -> Result<bool, BridgeError> {
        self.is_forked_within(block_id, self.policy.confirm_depth).await
    }

    /// Fork check over `depth` ancestors of `block_id`.
    pub async fn is_forked_within(&self, block_id: &Hash, depth: u64) -> Result<bool, BridgeError> {
        let Some(mut block) = self.ledger.block(BlockRef::Id(*block_id)).await? else {
            return Ok(true);
        };
        let canonical = self.ledger.block(BlockRef::Number(block.number)).await?;
        if canonical.map(|b| b.id) != Some(block.id) {
            return Ok(true);
        }

        for _ in 0..depth {
            if block.number == 0 {
                return Ok(false);
            }
            let Some(parent) = self.ledger.block(BlockRef::Number(block.number - 1)).await? else {
                return Ok(true);
            };
            if parent.id != block.parent_id {
                return Ok(true);
            }
            block = parent;
        }
        Ok(false)
    }

    /// Track `txid` until it is final or `shutdown` turns true.
    ///
    /// Ledger errors end the wait with `Err`; they are never a status.
    pub async fn confirm_tx(
        &self,
        txid: Hash,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<ConfirmationOutcome, BridgeError> {
        let record = self.track(txid).await?;
        loop {
            if *shutdown.borrow() {
                return Ok(ConfirmationOutcome::Cancelled);
            }

            let status = self.check_tx_status(&record).await?;
            if status.is_terminal() {
                TX_OUTCOMES
                    .with_label_values(&[self.chain_name.as_str(), status.as_str()])
                    .inc();
                info!(
                    chain = %self.chain_name,
                    txid = %hash_to_hex(&txid),
                    %status,
                    "[bridge-finality] transaction final"
                );
                return Ok(ConfirmationOutcome::Final(status));
            }

            tokio::select! {
                _ = tokio::time::sleep(self.policy.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(ConfirmationOutcome::Cancelled);
                    }
                }
            }
        }
    }
}

//! # Confirmation Flow
//!
//! A validator approves a snapshot root, the approval lands on the target
//! chain, and the monitor follows it to a terminal status.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use bridge_crypto::{keccak256, sign_payload};
use bridge_finality::{ConfirmationMonitor, ConfirmationOutcome, ConfirmationPolicy, TxStatus};
use bridge_sync::adapters::{MemoryLedger, MockSigner};
use bridge_sync::{approve_snapshot, build_snapshot, UPDATE_ROOT_OPERATION};
use bridge_types::{ChainRange, ChainSide, Hash};

use super::fixtures::BridgeHarness;

fn monitor(ledger: &Arc<MemoryLedger>) -> ConfirmationMonitor<MemoryLedger> {
    ConfirmationMonitor::new(
        "ethereum",
        ChainSide::Target,
        ConfirmationPolicy::new(3, 6, Duration::from_millis(5)).unwrap(),
        Arc::clone(ledger),
    )
    .unwrap()
}

fn approval_txid() -> Hash {
    let chains = [
        ChainRange::new("vechain", "0x27", 0, 10).unwrap(),
        ChainRange::new("ethereum", "5", 0, 4).unwrap(),
    ];
    let (snapshot, _) = build_snapshot(chains, &[0xA1u8; 32], &[[0x01u8; 32]]);
    let approval = approve_snapshot(&MockSigner::new([0x42u8; 32]), &snapshot).unwrap();
    assert_eq!(approval.digest, sign_payload(UPDATE_ROOT_OPERATION, &snapshot.merkle_root));
    keccak256(&approval.signature)
}

#[tokio::test]
async fn test_approval_confirms_after_depth() {
    let bridge = BridgeHarness::new();
    let txid = approval_txid();
    let ledger = Arc::clone(&bridge.target.ledger);
    let monitor = monitor(&ledger);
    let (_stop, shutdown) = watch::channel(false);

    let chain = Arc::clone(&ledger);
    let miner = tokio::spawn(async move {
        chain.advance(1);
        chain.include_tx(txid, 2, true);
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_millis(3)).await;
            chain.advance(1);
        }
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), monitor.confirm_tx(txid, shutdown))
        .await
        .unwrap()
        .unwrap();
    miner.await.unwrap();
    assert_eq!(outcome, ConfirmationOutcome::Final(TxStatus::Confirmed));
}

#[tokio::test]
async fn test_reorged_approval_waits_for_reinclusion() {
    let bridge = BridgeHarness::new();
    let txid = approval_txid();
    let ledger = Arc::clone(&bridge.target.ledger);
    let monitor = monitor(&ledger);

    let record = monitor.track(txid).await.unwrap();
    ledger.include_tx(txid, 4, true);
    ledger.extend_to(10);
    ledger.reorg_from(3);
    assert_eq!(monitor.check_tx_status(&record).await.unwrap(), TxStatus::Pending);

    ledger.include_tx(txid, 5, true);
    assert_eq!(monitor.check_tx_status(&record).await.unwrap(), TxStatus::Confirmed);
}

#[tokio::test]
async fn test_lost_approval_expires() {
    let bridge = BridgeHarness::new();
    let ledger = Arc::clone(&bridge.target.ledger);
    let monitor = monitor(&ledger);
    let (_stop, shutdown) = watch::channel(false);

    let chain = Arc::clone(&ledger);
    let miner = tokio::spawn(async move {
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(3)).await;
            chain.advance(1);
        }
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), monitor.confirm_tx(approval_txid(), shutdown))
        .await
        .unwrap()
        .unwrap();
    miner.await.unwrap();
    assert_eq!(outcome, ConfirmationOutcome::Final(TxStatus::Expired));
}

#[tokio::test]
async fn test_shutdown_cancels_pending_confirmation() {
    let bridge = BridgeHarness::new();
    let monitor = monitor(&bridge.target.ledger);
    let (stop, shutdown) = watch::channel(false);

    let waiter = monitor.confirm_tx(approval_txid(), shutdown);
    let stopper = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.send(true).unwrap();
    };
    let (outcome, _) = tokio::join!(waiter, stopper);
    assert_eq!(outcome.unwrap(), ConfirmationOutcome::Cancelled);
}

//! # Snapshot Flow
//!
//! Hashes submitted on one chain are committed on the other; the reconciler
//! recovers the snapshot and every submitted hash proves against its root.
//!
//! ```text
//! source: SubmitHashEvent x3 ──→ build_snapshot ──→ target: UpdateMerkleRoot
//!                                                           │
//!                        proof(leaf) ←── reconcile latest ←─┘
//! ```

use bridge_crypto::{check_bridge_tx, leaf_hash, merkle, ProofNode};
use bridge_sync::{build_snapshot, build_swap_snapshot, SnapshotApi};
use bridge_types::hex::hash_to_hex;
use bridge_types::{BridgeError, BridgeTxKind, ChainRange, ChainSide};
use proptest::prelude::*;

use super::fixtures::{BridgeHarness, SwapSpec};

const APP: [u8; 32] = [0xA1u8; 32];

fn ranges(src: (u64, u64), tgt: (u64, u64)) -> [ChainRange; 2] {
    [
        ChainRange::new("vechain", "0x27", src.0, src.1).unwrap(),
        ChainRange::new("ethereum", "5", tgt.0, tgt.1).unwrap(),
    ]
}

#[tokio::test]
async fn test_submitted_hashes_prove_against_committed_root() {
    let bridge = BridgeHarness::new();
    for (hash, block) in [([0x01u8; 32], 3), ([0x02u8; 32], 3), ([0x03u8; 32], 7)] {
        bridge.source.submit_hash(APP, [0x5Eu8; 20], hash, block);
    }
    bridge.source.ledger.extend_to(10);

    let source = bridge.reconciler(ChainSide::Source).unwrap();
    let events = source.get_hash_events_by_range(0, 9).await.unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events.iter().map(|e| e.log_index).collect::<Vec<_>>(), vec![0, 1, 0]);

    let hashes: Vec<_> = events.iter().map(|e| e.hash).collect();
    let (snapshot, tree) = build_snapshot(ranges((0, 10), (0, 5)), &APP, &hashes);
    bridge.target.commit(&snapshot, 6);

    let target = bridge.reconciler(ChainSide::Target).unwrap();
    let latest = target.get_latest_snapshot().await.unwrap();
    assert_eq!(latest.snapshot, snapshot);
    assert_eq!(latest.block_number, 6);

    let indexed = target.get_snapshot_by_root(&snapshot.merkle_root).await.unwrap();
    assert_eq!(indexed.index, 1);

    for event in &events {
        let leaf = leaf_hash(&APP, &event.hash);
        let proof = tree.proof(&leaf).unwrap();
        assert!(merkle::verify(&leaf, &latest.snapshot.merkle_root, &proof));

        let proof_strings: Vec<String> = proof.iter().map(ProofNode::to_string).collect();
        assert!(merkle::verify_hex(
            &hash_to_hex(&leaf),
            &hash_to_hex(&snapshot.merkle_root),
            &proof_strings
        ));
    }

    let foreign = leaf_hash(&APP, &[0xFFu8; 32]);
    assert!(matches!(tree.proof(&foreign), Err(BridgeError::LeafNotFound(_))));
}

#[tokio::test]
async fn test_swap_snapshot_excludes_claims() {
    let bridge = BridgeHarness::new();
    let swap = SwapSpec {
        token: [0x70u8; 20],
        from: [0xF0u8; 20],
        recipient: [0xE0u8; 20],
        amount: 1_000,
        reward: 25,
        swap_count: 1,
    };
    bridge.source.swap(&swap, 2);
    bridge.source.swap(&SwapSpec { swap_count: 2, ..swap.clone() }, 2);
    bridge.source.claim([0x70u8; 20], [0xE0u8; 20], 500, 4);

    let source = bridge.reconciler(ChainSide::Source).unwrap();
    let txs = source.scan_bridge_txs(0, 5).await.unwrap();
    assert_eq!(txs.len(), 3);
    for tx in &txs {
        check_bridge_tx(tx).unwrap();
    }
    match &txs[0].kind {
        BridgeTxKind::Swap(details) => assert_eq!(details.amount_out.as_u64(), 975),
        BridgeTxKind::Claim => panic!("expected swap first"),
    }

    let (snapshot, tree) = build_swap_snapshot(ranges((0, 6), (0, 0)), &txs);
    assert_eq!(tree.len(), 3);
    for tx in &txs {
        match tx.swap_tx_hash() {
            Some(hash) => {
                let proof = tree.proof(&hash).unwrap();
                assert!(merkle::verify(&hash, &snapshot.merkle_root, &proof));
            }
            None => assert!(tree.proof(&tx.bridge_tx_id).is_err()),
        }
    }
}

#[tokio::test]
async fn test_snapshot_chain_by_index() {
    let bridge = BridgeHarness::new();
    let (first, _) = build_snapshot(ranges((0, 10), (0, 4)), &APP, &[[0x01u8; 32]]);
    let (second, _) = build_snapshot(ranges((10, 20), (4, 9)), &APP, &[[0x02u8; 32]]);
    bridge.target.commit(&first, 3);
    bridge.target.commit(&second, 8);

    let target = bridge.reconciler(ChainSide::Target).unwrap();
    assert_eq!(target.get_root_count().await.unwrap(), 2);
    assert_eq!(target.get_snapshot_by_index(0).await.unwrap(), bridge.config.genesis_snapshot());
    let one = target.get_snapshot_by_index(1).await.unwrap();
    let two = target.get_snapshot_by_index(2).await.unwrap();
    assert!(one.follows(&bridge.config.genesis_snapshot()));
    assert!(two.follows(&one));
    assert_eq!(two, second);

    let by_range = target.get_snapshots_by_range(0, 8).await.unwrap();
    assert_eq!(by_range, vec![first, second]);
}

#[tokio::test]
async fn test_fresh_bridge_reports_genesis() {
    let bridge = BridgeHarness::new();
    bridge.source.ledger.extend_to(25);
    let latest = bridge
        .reconciler(ChainSide::Source)
        .unwrap()
        .get_latest_snapshot()
        .await
        .unwrap();
    assert_eq!(latest.snapshot, bridge.config.genesis_snapshot());
    assert_eq!(latest.txid, None);
    // Window 10 from head 25 down to block 0.
    assert_eq!(bridge.source.ledger.event_queries().len(), 3);
}

proptest! {
    #[test]
    fn prop_snapshot_root_ignores_submission_order(
        hashes in prop::collection::vec(any::<[u8; 32]>(), 0..20),
        seed in any::<usize>(),
    ) {
        let mut shuffled = hashes.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left(seed % len);
        }
        let chains = ranges((0, 10), (0, 10));
        let (a, _) = build_snapshot(chains.clone(), &APP, &hashes);
        let (b, _) = build_snapshot(chains, &APP, &shuffled);
        prop_assert_eq!(a.merkle_root, b.merkle_root);
    }
}

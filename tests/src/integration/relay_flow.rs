//! # Relay Flow
//!
//! Both relay loops write into one store; cursors, contiguity and restarts.

use std::sync::Arc;
use std::time::Duration;

use bridge_sync::{build_snapshot, RelayLoop, SnapshotStore};
use bridge_types::{BridgeError, ChainRange, ChainSide};
use relayer_runtime::{RelayerRuntime, SideBackend};

use super::fixtures::{BridgeHarness, SwapSpec};

fn ranges(src: (u64, u64), tgt: (u64, u64)) -> [ChainRange; 2] {
    [
        ChainRange::new("vechain", "0x27", src.0, src.1).unwrap(),
        ChainRange::new("ethereum", "5", tgt.0, tgt.1).unwrap(),
    ]
}

async fn wait_for_cursor<S: SnapshotStore>(store: &S, side: ChainSide, at_least: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if store.cursor(side).await.unwrap().is_some_and(|c| c >= at_least) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_runtime_relays_both_sides_into_one_store() {
    let bridge = BridgeHarness::new();
    bridge.source.submit_hash([0xA1u8; 32], [0x5Eu8; 20], [0x01u8; 32], 4);
    bridge.source.swap(
        &SwapSpec {
            token: [0x70u8; 20],
            from: [0xF0u8; 20],
            recipient: [0xE0u8; 20],
            amount: 100,
            reward: 1,
            swap_count: 1,
        },
        6,
    );
    let (snapshot, _) = build_snapshot(ranges((0, 8), (0, 3)), &[0xA1u8; 32], &[[0x01u8; 32]]);
    bridge.target.commit(&snapshot, 9);
    bridge.source.ledger.extend_to(40);
    bridge.target.ledger.extend_to(40);

    let backend = |side: ChainSide| SideBackend {
        ledger: Arc::clone(&bridge.chain(side).ledger),
        registry: Arc::clone(&bridge.chain(side).registry),
    };
    let mut runtime = RelayerRuntime::new(
        bridge.config.clone(),
        backend(ChainSide::Source),
        backend(ChainSide::Target),
        Arc::clone(&bridge.store),
    )
    .unwrap();
    runtime.start().unwrap();

    wait_for_cursor(bridge.store.as_ref(), ChainSide::Source, 37).await;
    wait_for_cursor(bridge.store.as_ref(), ChainSide::Target, 37).await;
    runtime.shutdown().await;

    assert_eq!(bridge.store.hash_events().len(), 1);
    assert_eq!(bridge.store.bridge_txs().len(), 1);
    assert_eq!(bridge.store.snapshots(ChainSide::Target), vec![snapshot]);
    assert!(bridge.store.snapshots(ChainSide::Source).is_empty());
    assert_eq!(bridge.store.blocks("vechain").len(), 38);
    assert_eq!(bridge.store.blocks("ethereum").len(), 38);
}

#[tokio::test]
async fn test_restarted_relay_resumes_from_cursor() {
    let bridge = BridgeHarness::new();
    bridge.source.ledger.extend_to(30);
    let relay = || {
        RelayLoop::new(
            bridge.config.clone(),
            ChainSide::Source,
            Arc::clone(&bridge.source.ledger),
            Arc::clone(&bridge.source.registry),
            Arc::clone(&bridge.store),
        )
        .unwrap()
    };

    let first = relay().tick().await.unwrap().unwrap();
    assert_eq!((first.from, first.to), (0, 27));

    bridge.source.ledger.advance(10);
    bridge.source.ledger.clear_queries();
    let resumed = relay().tick().await.unwrap().unwrap();
    assert_eq!((resumed.from, resumed.to), (28, 37));
    assert!(bridge
        .source
        .ledger
        .event_queries()
        .iter()
        .all(|(from, _, _)| *from >= 28));
}

#[tokio::test]
async fn test_gap_on_one_side_does_not_block_the_other() {
    let bridge = BridgeHarness::new();
    let (first, _) = build_snapshot(ranges((0, 10), (0, 4)), &[0xA1u8; 32], &[]);
    let (gap, _) = build_snapshot(ranges((12, 20), (4, 9)), &[0xA1u8; 32], &[]);
    bridge.target.commit(&first, 3);
    bridge.target.commit(&gap, 8);
    bridge.source.ledger.extend_to(20);
    bridge.target.ledger.extend_to(20);

    let relay = |side: ChainSide| {
        RelayLoop::new(
            bridge.config.clone(),
            side,
            Arc::clone(&bridge.chain(side).ledger),
            Arc::clone(&bridge.chain(side).registry),
            Arc::clone(&bridge.store),
        )
        .unwrap()
    };

    assert!(relay(ChainSide::Source).tick().await.unwrap().is_some());
    assert!(matches!(
        relay(ChainSide::Target).tick().await,
        Err(BridgeError::InvariantViolation(_))
    ));
    assert_eq!(bridge.store.cursor(ChainSide::Source).await.unwrap(), Some(17));
    assert_eq!(bridge.store.cursor(ChainSide::Target).await.unwrap(), None);
}

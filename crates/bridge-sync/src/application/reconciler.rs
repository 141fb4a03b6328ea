//! # Snapshot Reconciler
//!
//! Rebuilds snapshots, hash events, bridge transactions and token
//! registrations of one bridge side from that side's ledger and root table.
//!
//! ## Snapshot lookup
//!
//! | Query | Genesis | Unknown |
//! |-------|---------|---------|
//! | latest | no commit event since `start_block`, or the event commits the genesis root | n/a |
//! | by index | index 0 | zero root at the index |
//! | by root | configured genesis root | table index 0 |
//!
//! ## Leaf sets
//!
//! Application snapshot: `[commitment] ++ sorted(leaf_hash(app_id, e))`.
//! Swap snapshot: `[commitment] ++ sorted(swap_tx_hash)`. Claims never enter
//! a tree.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use bridge_crypto::{chain_range_commitment, decode_range_args, leaf_hash, merkle, MerkleTree, RangeArgs};
use bridge_telemetry::SNAPSHOTS_RECONCILED;
use bridge_types::{
    BlockIndex, BlockRef, BridgeError, BridgeSnapshot, BridgeTx, ChainRange, ChainSide,
    EventFilter, Hash, HashEvent, LedgerReader, TokenInfo, ZERO_ROOT,
};

use crate::algorithms::{
    decode_bridge_tx, decode_commit, decode_submit_hash, decode_token_updated, BlockEventIndex,
    WindowedScanner,
};
use crate::config::{BridgeConfig, ChainSideConfig};
use crate::ports::{IndexedSnapshot, LatestSnapshot, RootRegistry, SnapshotApi};

/// Snapshot over `chains` committing `events` submitted under `app_id`.
pub fn build_snapshot(
    chains: [ChainRange; 2],
    app_id: &Hash,
    events: &[Hash],
) -> (BridgeSnapshot, MerkleTree) {
    let leaves = events.iter().map(|e| leaf_hash(app_id, e)).collect();
    finish(chains, leaves)
}

/// Snapshot over `chains` committing the swaps among `txs`.
pub fn build_swap_snapshot(chains: [ChainRange; 2], txs: &[BridgeTx]) -> (BridgeSnapshot, MerkleTree) {
    let leaves = txs.iter().filter_map(BridgeTx::swap_tx_hash).collect();
    finish(chains, leaves)
}

fn finish(chains: [ChainRange; 2], leaves: Vec<Hash>) -> (BridgeSnapshot, MerkleTree) {
    let leaves = merkle::snapshot_leaves(chain_range_commitment(&chains), leaves);
    let tree = merkle::build(&leaves);
    let snapshot = BridgeSnapshot {
        merkle_root: tree.root(),
        chains,
    };
    (snapshot, tree)
}

/// Read side of one bridge chain.
pub struct SnapshotReconciler<L, R>
where
    L: LedgerReader,
    R: RootRegistry,
{
    config: BridgeConfig,
    side: ChainSide,
    ledger: Arc<L>,
    registry: Arc<R>,
}

impl<L, R> SnapshotReconciler<L, R>
where
    L: LedgerReader,
    R: RootRegistry,
{
    /// Reconciler for `side`. Fails on an invalid config.
    pub fn new(
        config: BridgeConfig,
        side: ChainSide,
        ledger: Arc<L>,
        registry: Arc<R>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        Ok(Self {
            config,
            side,
            ledger,
            registry,
        })
    }

    /// Side this reconciler reads.
    pub fn side(&self) -> ChainSide {
        self.side
    }

    /// Bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn chain(&self) -> &ChainSideConfig {
        self.config.side(self.side)
    }

    fn scanner(&self) -> Result<WindowedScanner<'_, L>, BridgeError> {
        let chain = self.chain();
        WindowedScanner::new(self.ledger.as_ref(), &chain.chain_name, chain.scan_window)
    }

    fn commit_filter(&self) -> EventFilter {
        let chain = self.chain();
        EventFilter::new(chain.contracts.bridge_core, chain.signatures.commit)
    }

    fn snapshot_from(&self, root: Hash, args: RangeArgs) -> Result<BridgeSnapshot, BridgeError> {
        if root == self.config.genesis.merkle_root {
            return Ok(self.config.genesis_snapshot());
        }
        let (source, target) = (&self.config.source, &self.config.target);
        let chains = args.into_ranges(
            (&source.chain_name, &source.chain_id),
            (&target.chain_name, &target.chain_id),
        )?;
        Ok(BridgeSnapshot {
            merkle_root: root,
            chains,
        })
    }

    fn mark_reconciled(&self) {
        SNAPSHOTS_RECONCILED
            .with_label_values(&[self.chain().chain_name.as_str()])
            .inc();
    }
}

#[async_trait]
impl<L, R> SnapshotApi for SnapshotReconciler<L, R>
where
    L: LedgerReader,
    R: RootRegistry,
{
    async fn get_latest_snapshot(&self) -> Result<LatestSnapshot, BridgeError> {
        let chain = self.chain();
        let head = self.ledger.head().await?;
        let filter = self.commit_filter();
        let found = self
            .scanner()?
            .scan_backward_until_found(&filter, head, chain.start_block)
            .await?;

        let latest = match found {
            Some(event) => {
                let (root, args) = decode_commit(&event)?;
                LatestSnapshot {
                    snapshot: self.snapshot_from(root, args)?,
                    txid: Some(event.txid),
                    block_number: event.block_number,
                }
            }
            None => {
                debug!(chain = %chain.chain_name, "[bridge-sync] no commit found, using genesis");
                LatestSnapshot {
                    snapshot: self.config.genesis_snapshot(),
                    txid: None,
                    block_number: 0,
                }
            }
        };
        self.mark_reconciled();
        Ok(latest)
    }

    async fn get_snapshot_by_index(&self, index: u64) -> Result<BridgeSnapshot, BridgeError> {
        if index == 0 {
            return Ok(self.config.genesis_snapshot());
        }
        let root = self.registry.root_at(index).await?;
        if root == ZERO_ROOT {
            return Err(BridgeError::NotFound(format!("no root at index {index}")));
        }
        let info = self.registry.root_info(&root).await?;
        if info.index == 0 {
            return Err(BridgeError::NotFound(format!("root at index {index} has no info")));
        }
        let snapshot = self.snapshot_from(root, decode_range_args(&info.args)?)?;
        self.mark_reconciled();
        Ok(snapshot)
    }

    async fn get_snapshot_by_root(&self, root: &Hash) -> Result<IndexedSnapshot, BridgeError> {
        if *root == self.config.genesis.merkle_root {
            return Ok(IndexedSnapshot {
                index: 0,
                snapshot: self.config.genesis_snapshot(),
            });
        }
        let info = self.registry.root_info(root).await?;
        if info.index == 0 {
            return Err(BridgeError::NotFound(format!(
                "root {} not in table",
                bridge_types::hex::hash_to_hex(root)
            )));
        }
        let snapshot = self.snapshot_from(*root, decode_range_args(&info.args)?)?;
        self.mark_reconciled();
        Ok(IndexedSnapshot {
            index: info.index,
            snapshot,
        })
    }

    async fn get_root_count(&self) -> Result<u64, BridgeError> {
        self.registry.root_count().await
    }

    async fn get_snapshots_by_range(&self, begin: u64, end: u64) -> Result<Vec<BridgeSnapshot>, BridgeError> {
        let filter = self.commit_filter();
        let events = self.scanner()?.collect_forward(&filter, begin, end).await?;
        let snapshots = events
            .iter()
            .map(|event| {
                let (root, args) = decode_commit(event)?;
                self.snapshot_from(root, args)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !snapshots.is_empty() {
            info!(
                chain = %self.chain().chain_name,
                begin,
                end,
                count = snapshots.len(),
                "[bridge-sync] snapshots reconciled"
            );
        }
        Ok(snapshots)
    }

    async fn get_hash_events_by_range(&self, begin: u64, end: u64) -> Result<Vec<HashEvent>, BridgeError> {
        let chain = self.chain();
        let filter = EventFilter::new(chain.contracts.bridge_core, chain.signatures.submit_hash);
        let events = self.scanner()?.collect_forward(&filter, begin, end).await?;

        let mut index = BlockEventIndex::default();
        events
            .iter()
            .map(|event| decode_submit_hash(chain, event, index.next(&event.block_id)))
            .collect()
    }

    async fn scan_bridge_txs(&self, begin: u64, end: u64) -> Result<Vec<BridgeTx>, BridgeError> {
        let chain = self.chain();
        let filter = EventFilter::with_topics(
            chain.contracts.ft_bridge,
            vec![chain.signatures.swap, chain.signatures.claim],
        );
        let events = self.scanner()?.collect_forward(&filter, begin, end).await?;

        let mut index = BlockEventIndex::default();
        let mut txs = Vec::with_capacity(events.len());
        for event in &events {
            let position = index.next(&event.block_id);
            if let Some(tx) = decode_bridge_tx(chain, &chain.signatures, event, position)? {
                txs.push(tx);
            }
        }
        Ok(txs)
    }

    async fn get_token_infos_by_range(&self, begin: u64, end: u64) -> Result<Vec<TokenInfo>, BridgeError> {
        let chain = self.chain();
        let counterpart = self.config.side(self.side.counterpart());
        let filter = EventFilter::new(chain.contracts.ft_bridge_tokens, chain.signatures.token_updated);
        let events = self.scanner()?.collect_forward(&filter, begin, end).await?;

        let mut infos = Vec::with_capacity(events.len());
        for event in &events {
            let token = event
                .topics
                .get(1)
                .map(bridge_types::hex::topic_to_address)
                .ok_or_else(|| BridgeError::Decode("token updated: missing token topic".into()))?;
            let metadata = self.ledger.token_metadata(&token).await?.ok_or_else(|| {
                BridgeError::NotFound(format!(
                    "{}: no token contract at {}",
                    chain.chain_name,
                    bridge_types::hex::to_hex(&token)
                ))
            })?;
            infos.push(decode_token_updated(chain, counterpart, event, metadata)?);
        }
        debug!(chain = %chain.chain_name, begin, end, count = infos.len(), "[bridge-sync] token updates scanned");
        Ok(infos)
    }

    async fn get_block_index(&self, begin: u64, end: u64) -> Result<Vec<BlockIndex>, BridgeError> {
        let chain = self.chain();
        let mut blocks = Vec::new();
        for number in begin..=end {
            let Some(block) = self.ledger.block(BlockRef::Number(number)).await? else {
                break;
            };
            blocks.push(BlockIndex {
                chain_name: chain.chain_name.clone(),
                chain_id: chain.chain_id.clone(),
                block_id: block.id,
                block_num: block.number,
                timestamp: block.timestamp,
            });
        }
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryLedger, MemoryRegistry};
    use crate::algorithms::{address_topic, u256_word};
    use bridge_crypto::encode_range_args;
    use bridge_types::{BridgeTxKind, Order, U256};

    struct Fixture {
        config: BridgeConfig,
        ledger: Arc<MemoryLedger>,
        registry: Arc<MemoryRegistry>,
        reconciler: SnapshotReconciler<MemoryLedger, MemoryRegistry>,
    }

    fn fixture() -> Fixture {
        let config = BridgeConfig::for_testing();
        let ledger = Arc::new(MemoryLedger::new("ethereum"));
        let registry = Arc::new(MemoryRegistry::new());
        let reconciler =
            SnapshotReconciler::new(config.clone(), ChainSide::Target, ledger.clone(), registry.clone())
                .unwrap();
        Fixture {
            config,
            ledger,
            registry,
            reconciler,
        }
    }

    fn ranges(src_end: u64, tgt_end: u64) -> [ChainRange; 2] {
        [
            ChainRange::new("vechain", "0x27", 0, src_end).unwrap(),
            ChainRange::new("ethereum", "5", 0, tgt_end).unwrap(),
        ]
    }

    fn commit(f: &Fixture, root: Hash, chains: &[ChainRange; 2], block: u64) {
        let side = &f.config.target;
        f.ledger.emit(
            side.contracts.bridge_core,
            vec![side.signatures.commit, root],
            encode_range_args(chains),
            block,
        );
    }

    #[tokio::test]
    async fn test_latest_falls_back_to_genesis() {
        let f = fixture();
        f.ledger.extend_to(40);
        let latest = f.reconciler.get_latest_snapshot().await.unwrap();
        assert_eq!(latest.snapshot, f.config.genesis_snapshot());
        assert_eq!(latest.txid, None);
        assert_eq!(latest.block_number, 0);
    }

    #[tokio::test]
    async fn test_latest_returns_newest_commit() {
        let f = fixture();
        commit(&f, [0x01u8; 32], &ranges(10, 5), 12);
        commit(&f, [0x02u8; 32], &ranges(20, 9), 33);
        f.ledger.extend_to(40);

        let latest = f.reconciler.get_latest_snapshot().await.unwrap();
        assert_eq!(latest.snapshot.merkle_root, [0x02u8; 32]);
        assert_eq!(latest.snapshot.chains, ranges(20, 9));
        assert_eq!(latest.block_number, 33);
        assert!(latest.txid.is_some());
        // Window 10 from head 40: [30, 40] holds block 33.
        assert_eq!(f.ledger.event_queries(), vec![(30, 40, Order::Desc)]);
    }

    #[tokio::test]
    async fn test_latest_genesis_root_returns_configured_genesis() {
        let f = fixture();
        commit(&f, f.config.genesis.merkle_root, &ranges(99, 99), 5);
        let latest = f.reconciler.get_latest_snapshot().await.unwrap();
        assert_eq!(latest.snapshot, f.config.genesis_snapshot());
        assert_eq!(latest.block_number, 5);
    }

    #[tokio::test]
    async fn test_snapshot_by_index() {
        let f = fixture();
        assert_eq!(
            f.reconciler.get_snapshot_by_index(0).await.unwrap(),
            f.config.genesis_snapshot()
        );
        f.registry.push([0x0Au8; 32], &ranges(7, 3));
        let snapshot = f.reconciler.get_snapshot_by_index(1).await.unwrap();
        assert_eq!(snapshot.merkle_root, [0x0Au8; 32]);
        assert_eq!(snapshot.chains, ranges(7, 3));
        assert!(matches!(
            f.reconciler.get_snapshot_by_index(2).await,
            Err(BridgeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_by_root() {
        let f = fixture();
        let genesis = f.reconciler.get_snapshot_by_root(&f.config.genesis.merkle_root).await.unwrap();
        assert_eq!(genesis.index, 0);

        f.registry.push([0x0Au8; 32], &ranges(7, 3));
        f.registry.push([0x0Bu8; 32], &ranges(9, 4));
        let found = f.reconciler.get_snapshot_by_root(&[0x0Bu8; 32]).await.unwrap();
        assert_eq!(found.index, 2);
        assert_eq!(found.snapshot.chains, ranges(9, 4));
        assert!(matches!(
            f.reconciler.get_snapshot_by_root(&[0xFFu8; 32]).await,
            Err(BridgeError::NotFound(_))
        ));
        assert_eq!(f.reconciler.get_root_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_args_are_decode_errors() {
        let f = fixture();
        f.registry.push_raw([0x0Au8; 32], vec![0x01, 0x02]);
        assert!(matches!(
            f.reconciler.get_snapshot_by_index(1).await,
            Err(BridgeError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshots_by_range_ascending() {
        let f = fixture();
        commit(&f, [0x01u8; 32], &ranges(10, 5), 12);
        commit(&f, [0x02u8; 32], &ranges(20, 9), 33);
        let snapshots = f.reconciler.get_snapshots_by_range(0, 40).await.unwrap();
        let roots: Vec<Hash> = snapshots.iter().map(|s| s.merkle_root).collect();
        assert_eq!(roots, vec![[0x01u8; 32], [0x02u8; 32]]);
    }

    #[tokio::test]
    async fn test_hash_events_index_per_block() {
        let f = fixture();
        let side = &f.config.target;
        for block in [4, 4, 6] {
            f.ledger.emit(
                side.contracts.bridge_core,
                vec![side.signatures.submit_hash, [0xAAu8; 32], address_topic(&[0x0Bu8; 20])],
                vec![block as u8; 32],
                block,
            );
        }
        let events = f.reconciler.get_hash_events_by_range(0, 10).await.unwrap();
        let indices: Vec<(u64, u32)> = events.iter().map(|e| (e.block_number, e.log_index)).collect();
        assert_eq!(indices, vec![(4, 0), (4, 1), (6, 0)]);
    }

    #[tokio::test]
    async fn test_scan_bridge_txs_mixed() {
        let f = fixture();
        let side = &f.config.target;
        let token = address_topic(&[0x70u8; 20]);
        let user = address_topic(&[0xE0u8; 20]);
        let swap_data = [u256_word(100u64.into()), u256_word(1u64.into()), u256_word(1u64.into())].concat();
        f.ledger.emit(
            side.contracts.ft_bridge,
            vec![side.signatures.swap, token, user, user],
            swap_data,
            8,
        );
        f.ledger.emit(
            side.contracts.ft_bridge,
            vec![side.signatures.claim, token, user],
            u256_word(50u64.into()).to_vec(),
            8,
        );
        // Other contracts are ignored.
        f.ledger.emit([0x99u8; 20], vec![side.signatures.claim, token, user], vec![0u8; 32], 8);

        let txs = f.reconciler.scan_bridge_txs(0, 10).await.unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind_code(), 1);
        assert_eq!(txs[0].base.log_index, 0);
        assert_eq!(txs[1].kind, BridgeTxKind::Claim);
        assert_eq!(txs[1].base.log_index, 1);
        assert_eq!(txs[1].base.amount, U256::from(50u64));
    }

    fn token_updated(f: &Fixture, token: [u8; 20], reward: u64, block: u64) {
        let side = &f.config.target;
        let data = [
            u256_word(U256::zero()),
            u256_word(1u64.into()),
            address_topic(&[0x71u8; 20]),
            u256_word(0u64.into()),
            u256_word(0u64.into()),
            u256_word(reward.into()),
        ]
        .concat();
        f.ledger.emit(
            side.contracts.ft_bridge_tokens,
            vec![side.signatures.token_updated, address_topic(&token)],
            data,
            block,
        );
    }

    #[tokio::test]
    async fn test_token_infos_by_range() {
        let f = fixture();
        f.ledger.register_token([0x70u8; 20], "Wrapped VET", "WVET", 18);
        token_updated(&f, [0x70u8; 20], 1, 3);
        token_updated(&f, [0x70u8; 20], 2, 9);
        token_updated(&f, [0x70u8; 20], 3, 30);

        let infos = f.reconciler.get_token_infos_by_range(0, 20).await.unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].reward, 1);
        assert_eq!(infos[1].update_block_num, 9);
        assert_eq!(infos[1].symbol, "WVET");
        assert_eq!(infos[1].chain_name, "ethereum");
        assert_eq!(infos[1].target_chain_name, "vechain");
        assert_eq!(infos[0].token_id, infos[1].token_id);
    }

    #[tokio::test]
    async fn test_token_update_without_contract_fails() {
        let f = fixture();
        token_updated(&f, [0x72u8; 20], 1, 3);
        assert!(matches!(
            f.reconciler.get_token_infos_by_range(0, 10).await,
            Err(BridgeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_block_index_stops_at_missing_block() {
        let f = fixture();
        f.ledger.extend_to(5);
        let blocks = f.reconciler.get_block_index(3, 9).await.unwrap();
        let numbers: Vec<u64> = blocks.iter().map(|b| b.block_num).collect();
        assert_eq!(numbers, vec![3, 4, 5]);
        assert_eq!(blocks[0].chain_name, "ethereum");
    }

    #[test]
    fn test_build_snapshot_orders_leaves() {
        let app = [0xAAu8; 32];
        let (a, tree_a) = build_snapshot(ranges(10, 10), &app, &[[1u8; 32], [2u8; 32], [3u8; 32]]);
        let (b, _) = build_snapshot(ranges(10, 10), &app, &[[3u8; 32], [1u8; 32], [2u8; 32]]);
        assert_eq!(a.merkle_root, b.merkle_root);
        assert_eq!(tree_a.leaves()[0], chain_range_commitment(&ranges(10, 10)));
        assert_eq!(tree_a.len(), 4);
    }

    #[test]
    fn test_build_snapshot_empty_is_commitment() {
        let (snapshot, tree) = build_snapshot(ranges(1, 1), &[0u8; 32], &[]);
        assert_eq!(snapshot.merkle_root, chain_range_commitment(&ranges(1, 1)));
        assert_eq!(tree.len(), 1);
    }
}

//! In-memory root table.

use async_trait::async_trait;
use parking_lot::RwLock;

use bridge_crypto::encode_range_args;
use bridge_types::{BridgeError, ChainRange, Hash, ZERO_ROOT};

use crate::ports::{RootInfo, RootRegistry};

/// Root table holding `(root, args)` entries at indices `1..=len`.
#[derive(Default)]
pub struct MemoryRegistry {
    roots: RwLock<Vec<(Hash, Vec<u8>)>>,
    should_fail: RwLock<bool>,
}

impl MemoryRegistry {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a root with its encoded ranges. Returns the assigned index.
    pub fn push(&self, root: Hash, chains: &[ChainRange; 2]) -> u64 {
        let mut roots = self.roots.write();
        roots.push((root, encode_range_args(chains)));
        roots.len() as u64
    }

    /// Record a root with raw argument bytes.
    pub fn push_raw(&self, root: Hash, args: Vec<u8>) -> u64 {
        let mut roots = self.roots.write();
        roots.push((root, args));
        roots.len() as u64
    }

    /// Fail every call while set.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write() = fail;
    }

    fn check(&self) -> Result<(), BridgeError> {
        if *self.should_fail.read() {
            return Err(BridgeError::TransientIo("root registry unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RootRegistry for MemoryRegistry {
    async fn root_count(&self) -> Result<u64, BridgeError> {
        self.check()?;
        Ok(self.roots.read().len() as u64)
    }

    async fn root_at(&self, index: u64) -> Result<Hash, BridgeError> {
        self.check()?;
        let roots = self.roots.read();
        Ok(index
            .checked_sub(1)
            .and_then(|i| roots.get(i as usize))
            .map(|(root, _)| *root)
            .unwrap_or(ZERO_ROOT))
    }

    async fn root_info(&self, root: &Hash) -> Result<RootInfo, BridgeError> {
        self.check()?;
        let roots = self.roots.read();
        Ok(roots
            .iter()
            .position(|(r, _)| r == root)
            .map(|i| RootInfo {
                index: i as u64 + 1,
                args: roots[i].1.clone(),
            })
            .unwrap_or(RootInfo {
                index: 0,
                args: Vec::new(),
            }))
    }
}

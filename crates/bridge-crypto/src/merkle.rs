//! # Snapshot Merkle Engine
//!
//! Builds the commitment tree for one snapshot, produces inclusion proofs and
//! verifies them.
//!
//! ## Tree shape
//!
//! - Leaf 0 is the chain range commitment; the tail is sorted ascending by
//!   numeric value (see `snapshot_leaves`).
//! - Adjacent nodes pair as `keccak(left ‖ right)`.
//! - An odd trailing node is promoted to the next level unchanged, so its
//!   proof has no entry for that level.
//! - No leaves: root is `ZERO_ROOT`. One leaf: root is the leaf.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use bridge_types::hex::{hash_to_hex, parse_hash};
use bridge_types::{BridgeError, Hash, U256, ZERO_ROOT};

use crate::hash_codec::hash_concat;

/// Side on which a proof sibling sits relative to the running hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// `hash = keccak(sibling ‖ current)`
    Left,
    /// `hash = keccak(current ‖ sibling)`
    Right,
}

/// One step of an inclusion proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// Sibling hash.
    pub hash: Hash,
    /// Sibling side.
    pub position: Position,
}

impl ProofNode {
    /// Sibling on the left.
    pub fn left(hash: Hash) -> Self {
        Self {
            hash,
            position: Position::Left,
        }
    }

    /// Sibling on the right.
    pub fn right(hash: Hash) -> Self {
        Self {
            hash,
            position: Position::Right,
        }
    }
}

/// Textual form `left:0x…` / `right:0x…`.
impl fmt::Display for ProofNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.position {
            Position::Left => "left",
            Position::Right => "right",
        };
        write!(f, "{}:{}", side, hash_to_hex(&self.hash))
    }
}

impl FromStr for ProofNode {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, hash) = s
            .split_once(':')
            .ok_or_else(|| BridgeError::Decode(format!("proof node without side: {s:?}")))?;
        let hash = parse_hash(hash)?;
        match side {
            "left" => Ok(ProofNode::left(hash)),
            "right" => Ok(ProofNode::right(hash)),
            other => Err(BridgeError::Decode(format!("unknown proof side {other:?}"))),
        }
    }
}

/// Immutable Merkle tree. `levels[0]` holds the leaves, the last level the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Root hash (`ZERO_ROOT` for an empty tree).
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(ZERO_ROOT)
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> &[Hash] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves().len()
    }

    /// True when built from no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves().is_empty()
    }

    /// Number of levels including the leaf level.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Inclusion proof for `leaf`, ordered bottom-up.
    ///
    /// When the leaf occurs more than once the first occurrence is proven.
    pub fn proof(&self, leaf: &Hash) -> Result<Vec<ProofNode>, BridgeError> {
        let mut index = self
            .leaves()
            .iter()
            .position(|l| l == leaf)
            .ok_or(BridgeError::LeafNotFound(*leaf))?;

        let mut proof = Vec::with_capacity(self.levels.len().saturating_sub(1));
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                proof.push(if index % 2 == 0 {
                    ProofNode::right(level[sibling])
                } else {
                    ProofNode::left(level[sibling])
                });
            }
            index /= 2;
        }
        Ok(proof)
    }
}

/// Build a tree over `leaves` exactly as given.
pub fn build(leaves: &[Hash]) -> MerkleTree {
    if leaves.is_empty() {
        return MerkleTree { levels: Vec::new() };
    }

    let mut levels = vec![leaves.to_vec()];
    while let Some(level) = levels.last().filter(|level| level.len() > 1) {
        let next: Vec<Hash> = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_concat(left, right),
                // Odd trailing node.
                _ => pair[0],
            })
            .collect();
        levels.push(next);
    }
    MerkleTree { levels }
}

/// Canonical leaf order for a snapshot: `commitment` first, then `leaves`
/// sorted ascending as 256-bit unsigned integers.
pub fn snapshot_leaves(commitment: Hash, mut leaves: Vec<Hash>) -> Vec<Hash> {
    leaves.sort_by_key(|leaf| U256::from_big_endian(leaf));
    let mut ordered = Vec::with_capacity(leaves.len() + 1);
    ordered.push(commitment);
    ordered.extend(leaves);
    ordered
}

/// Recompute the root from `leaf` and `proof` and compare with `root`.
pub fn verify(leaf: &Hash, root: &Hash, proof: &[ProofNode]) -> bool {
    let computed = proof.iter().fold(*leaf, |current, node| match node.position {
        Position::Left => hash_concat(&node.hash, &current),
        Position::Right => hash_concat(&current, &node.hash),
    });
    computed == *root
}

/// `verify` over untrusted strings. Any malformed input is `false`.
pub fn verify_hex(leaf: &str, root: &str, proof: &[String]) -> bool {
    let (Ok(leaf), Ok(root)) = (parse_hash(leaf), parse_hash(root)) else {
        return false;
    };
    let nodes: Result<Vec<ProofNode>, _> = proof.iter().map(|s| s.parse()).collect();
    match nodes {
        Ok(nodes) => verify(&leaf, &root, &nodes),
        Err(_) => false,
    }
}

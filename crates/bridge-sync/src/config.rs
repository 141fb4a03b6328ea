//! # Bridge Configuration
//!
//! Per-side chain settings plus the genesis snapshot both sides agree on.

use serde::{Deserialize, Serialize};

use bridge_crypto::keccak256;
use bridge_types::hex::serde_hex;
use bridge_types::{
    Address, BridgeError, BridgeSnapshot, ChainRange, ChainSide, Hash, ZERO_ROOT,
};

/// Default scan window (blocks per event query).
pub const DEFAULT_SCAN_WINDOW: u64 = 500;

/// Default confirmation depth.
pub const DEFAULT_CONFIRM_DEPTH: u64 = 12;

/// Default expiration horizon.
pub const DEFAULT_EXPIRE_DEPTH: u64 = 180;

/// Contracts watched on one chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractAddresses {
    /// Emits commit and submit-hash events; holds the root table.
    #[serde(with = "serde_hex")]
    pub bridge_core: Address,
    /// Bridge head contract receiving root updates from validators.
    #[serde(with = "serde_hex")]
    pub bridge_head: Address,
    /// Fungible-token bridge emitting swap and claim events.
    #[serde(with = "serde_hex")]
    pub ft_bridge: Address,
    /// Token registry of the fungible-token bridge; emits token updates.
    #[serde(with = "serde_hex")]
    pub ft_bridge_tokens: Address,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            bridge_core: [0u8; 20],
            bridge_head: [0u8; 20],
            ft_bridge: [0u8; 20],
            ft_bridge_tokens: [0u8; 20],
        }
    }
}

/// `topics[0]` values of the watched events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSignatures {
    /// `UpdateMerkleRoot(bytes32 indexed root, bytes args)`
    #[serde(with = "serde_hex")]
    pub commit: Hash,
    /// `SubmitHashEvent(bytes32 indexed appid, address indexed sender, bytes32 hash)`
    #[serde(with = "serde_hex")]
    pub submit_hash: Hash,
    /// `Swap(address indexed token, address indexed from, address indexed recipient, uint256, uint256, uint256)`
    #[serde(with = "serde_hex")]
    pub swap: Hash,
    /// `Claim(address indexed token, address indexed recipient, uint256)`
    #[serde(with = "serde_hex")]
    pub claim: Hash,
    /// `TokenUpdated(address indexed token, bool, uint8, address, uint256, uint256, uint256)`
    #[serde(with = "serde_hex")]
    pub token_updated: Hash,
}

impl Default for EventSignatures {
    fn default() -> Self {
        Self {
            commit: keccak256(b"UpdateMerkleRoot(bytes32,bytes)"),
            submit_hash: keccak256(b"SubmitHashEvent(bytes32,address,bytes32)"),
            swap: keccak256(b"Swap(address,address,address,uint256,uint256,uint256)"),
            claim: keccak256(b"Claim(address,address,uint256)"),
            token_updated: keccak256(b"TokenUpdated(address,bool,uint8,address,uint256,uint256,uint256)"),
        }
    }
}

/// Settings for one side of the bridge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSideConfig {
    /// Chain name used in commitments and identifiers.
    pub chain_name: String,

    /// Chain id used in commitments and identifiers.
    pub chain_id: String,

    /// First block the bridge cares about.
    pub start_block: u64,

    /// Blocks on top of a receipt before it counts as final.
    pub confirm_depth: u64,

    /// Blocks after submission before a missing receipt counts as expired.
    pub expire_depth: u64,

    /// Blocks per event query.
    pub scan_window: u64,

    /// Seconds between confirmation polls and relay ticks.
    pub poll_interval_secs: u64,

    /// Upper bound on blocks handled in one relay batch.
    pub max_batch_blocks: u64,

    /// Backoff ceiling after repeated relay failures.
    pub max_backoff_secs: u64,

    /// Watched contracts.
    pub contracts: ContractAddresses,

    /// Watched event signatures.
    pub signatures: EventSignatures,
}

impl Default for ChainSideConfig {
    fn default() -> Self {
        Self {
            chain_name: String::new(),
            chain_id: String::new(),
            start_block: 0,
            confirm_depth: DEFAULT_CONFIRM_DEPTH,
            expire_depth: DEFAULT_EXPIRE_DEPTH,
            scan_window: DEFAULT_SCAN_WINDOW,
            poll_interval_secs: 10,
            max_batch_blocks: 10_000,
            max_backoff_secs: 300,
            contracts: ContractAddresses::default(),
            signatures: EventSignatures::default(),
        }
    }
}

impl ChainSideConfig {
    /// Named chain with default tuning.
    pub fn named(chain_name: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            chain_name: chain_name.into(),
            chain_id: chain_id.into(),
            ..Self::default()
        }
    }

    /// Small windows and depths for tests.
    pub fn for_testing(chain_name: &str, chain_id: &str) -> Self {
        Self {
            chain_name: chain_name.to_string(),
            chain_id: chain_id.to_string(),
            start_block: 0,
            confirm_depth: 3,
            expire_depth: 6,
            scan_window: 10,
            poll_interval_secs: 1,
            max_batch_blocks: 50,
            max_backoff_secs: 8,
            contracts: ContractAddresses {
                bridge_core: [0xC0u8; 20],
                bridge_head: [0xC1u8; 20],
                ft_bridge: [0xC2u8; 20],
                ft_bridge_tokens: [0xC3u8; 20],
            },
            signatures: EventSignatures::default(),
        }
    }

    /// Empty range anchored at `start_block`.
    pub fn genesis_range(&self) -> ChainRange {
        ChainRange::empty_at(&self.chain_name, &self.chain_id, self.start_block)
    }

    /// Reject settings the algorithms cannot run with.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.chain_name.is_empty() || self.chain_id.is_empty() {
            return Err(BridgeError::InvariantViolation(
                "chain_name and chain_id must be set".into(),
            ));
        }
        if self.scan_window == 0 {
            return Err(BridgeError::InvariantViolation(format!(
                "{}: scan_window must be > 0",
                self.chain_name
            )));
        }
        if self.max_batch_blocks == 0 {
            return Err(BridgeError::InvariantViolation(format!(
                "{}: max_batch_blocks must be > 0",
                self.chain_name
            )));
        }
        if self.expire_depth < self.confirm_depth {
            return Err(BridgeError::InvariantViolation(format!(
                "{}: expire_depth {} < confirm_depth {}",
                self.chain_name, self.expire_depth, self.confirm_depth
            )));
        }
        Ok(())
    }
}

/// Genesis snapshot settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Root recorded on-chain at bridge deployment.
    #[serde(with = "serde_hex")]
    pub merkle_root: Hash,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            merkle_root: ZERO_ROOT,
        }
    }
}

/// Both sides of the bridge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// First range of every snapshot.
    pub source: ChainSideConfig,
    /// Second range of every snapshot.
    pub target: ChainSideConfig,
    /// Genesis snapshot.
    #[serde(default)]
    pub genesis: GenesisConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            source: ChainSideConfig::named("vechain", "0x4a"),
            target: ChainSideConfig::named("ethereum", "1"),
            genesis: GenesisConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Two test chains with small windows.
    pub fn for_testing() -> Self {
        Self {
            source: ChainSideConfig::for_testing("vechain", "0x27"),
            target: ChainSideConfig::for_testing("ethereum", "5"),
            genesis: GenesisConfig {
                merkle_root: [0x6Eu8; 32],
            },
        }
    }

    /// Settings of one side.
    pub fn side(&self, side: ChainSide) -> &ChainSideConfig {
        match side {
            ChainSide::Source => &self.source,
            ChainSide::Target => &self.target,
        }
    }

    /// Genesis snapshot: configured root over `[start, start)` on both sides.
    pub fn genesis_snapshot(&self) -> BridgeSnapshot {
        BridgeSnapshot {
            merkle_root: self.genesis.merkle_root,
            chains: [self.source.genesis_range(), self.target.genesis_range()],
        }
    }

    /// Validate both sides.
    pub fn validate(&self) -> Result<(), BridgeError> {
        self.source.validate()?;
        self.target.validate()
    }
}

//! # Bridge Sync
//!
//! Read side of the bridge relayer: scans each chain's bridge contracts in
//! bounded windows, rebuilds snapshots and activity records, and relays them
//! into the store.
//!
//! ## Data Flow
//!
//! ```text
//! LedgerReader ──events──→ WindowedScanner ──→ decoders ──→ SnapshotReconciler
//!                                                                  │
//! RootRegistry ──root table────────────────────────────────────────┘
//!                                                                  │
//!                                                             RelayLoop ──batch──→ SnapshotStore
//! ```
//!
//! ## Hexagonal Architecture
//!
//! - **Algorithms** (`algorithms/`): windowed scanning and event decoding
//! - **Application** (`application/`): reconciler, relay loop, root approval
//! - **Ports** (`ports/`): `SnapshotApi` inbound; ledger, registry, store and
//!   signer outbound
//! - **Adapters** (`adapters/`): in-memory ports for tests and dev mode
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Snapshot leaf 0 is the chain-range commitment | `build_snapshot`, `build_swap_snapshot` |
//! | Persisted snapshots are contiguous per side | `RelayLoop::tick` |
//! | Cursor only advances with a saved batch | `SnapshotStore::save_batch` |
//! | Scan window > 0 | `WindowedScanner::new`, `ChainSideConfig::validate` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod ports;

pub use algorithms::{BlockEventIndex, WindowedScanner};
pub use application::{
    approve_lock, approve_root, approve_snapshot, backoff_delay, build_snapshot,
    build_swap_snapshot, RelayLoop, RootApproval, SnapshotReconciler, TickReport,
    LOCK_BRIDGE_OPERATION, UPDATE_ROOT_OPERATION,
};
pub use config::{BridgeConfig, ChainSideConfig, ContractAddresses, EventSignatures, GenesisConfig};
pub use ports::{
    IndexedSnapshot, LatestSnapshot, LedgerReader, RootInfo, RootRegistry, Signer, SnapshotApi,
    SnapshotStore, StoreBatch,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

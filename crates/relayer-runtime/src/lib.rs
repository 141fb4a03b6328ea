//! # Bridge Relayer Runtime
//!
//! Wires the bridge crates into a running relayer.
//!
//! ## Modular Structure
//!
//! - `config/` - `RelayerConfig` from a JSON file plus `RELAYER_*` overrides
//! - `runtime/` - relay loops per side, confirmation monitors, shutdown
//!
//! ```text
//! source ledger ──→ RelayLoop(source) ──┐
//!                                       ├──→ SnapshotStore
//! target ledger ──→ RelayLoop(target) ──┘
//!
//! submitted tx ──→ ConfirmationMonitor(side) ──→ confirmed / reverted / expired
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod runtime;

pub use config::RelayerConfig;
pub use runtime::{dev_runtime, produce_blocks, DevRuntime, RelayerRuntime, SideBackend};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

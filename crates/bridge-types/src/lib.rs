//! # Bridge Types
//!
//! Shared data model for the bridge relayer workspace.
//!
//! ## Contents
//!
//! - `entities`: chain ranges, snapshots, bridge transactions, hash events
//! - `errors`: `BridgeError` taxonomy and the `Hash` / `Address` aliases
//! - `hex`: `0x` rendering and strict parsing
//! - `ledger`: the `LedgerReader` port and its value types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod errors;
pub mod hex;
pub mod ledger;

pub use entities::{
    BlockIndex, BridgeSnapshot, BridgeTx, BridgeTxKind, ChainRange, ChainSide, HashEvent,
    SwapDetails, TokenInfo, TxBase, U256,
};
pub use errors::{Address, BridgeError, BridgeResult, Hash, ZERO_ROOT};
pub use ledger::{
    Block, BlockRef, EventFilter, LedgerEvent, LedgerReader, Order, Receipt, TokenMetadata,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

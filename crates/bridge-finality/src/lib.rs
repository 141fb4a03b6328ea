//! # Bridge Finality
//!
//! Tracks transactions the relayer submitted until they are confirmed,
//! reverted or expired, guarding against receipts from reorganized blocks.
//!
//! ## State Machine
//!
//! | From | To | Condition |
//! |------|----|-----------|
//! | Pending | Confirmed | receipt success, `head - receipt.block >= confirm_depth`, not forked |
//! | Pending | Reverted | receipt failure, `head - receipt.block >= confirm_depth`, not forked |
//! | Pending | Expired | no receipt, `head - block_ref > expire_depth` |
//!
//! Ledger errors surface as `Err(BridgeError)` and never as a status.
//! `confirm_tx` is cancelled through a `tokio::sync::watch` channel.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod monitor;

pub use domain::{evaluate, ConfirmationOutcome, ConfirmationPolicy, ConfirmationRecord, TxStatus};
pub use monitor::ConfirmationMonitor;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

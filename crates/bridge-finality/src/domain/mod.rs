//! # Domain Layer
//!
//! Transaction status state machine. No I/O.

pub mod state;

pub use state::{evaluate, ConfirmationOutcome, ConfirmationPolicy, ConfirmationRecord, TxStatus};

//! # Algorithms
//!
//! Windowed scanning and event decoding. No state beyond a single call.

pub mod decode;
pub mod window_scan;

pub use decode::{
    address_topic, decode_bridge_tx, decode_claim, decode_commit, decode_submit_hash,
    decode_swap, decode_token_updated, u256_word, BlockEventIndex,
};
pub use window_scan::WindowedScanner;

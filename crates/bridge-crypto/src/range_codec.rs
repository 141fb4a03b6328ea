//! # Commit Range Arguments
//!
//! The commit event payload and the on-chain root table both carry the two
//! chain ranges of a snapshot as an RLP list of four unsigned integers:
//! `[source_begin, source_end, target_begin, target_end]`.
//!
//! Block numbers are held as `u64`. The contracts accept integers of up to 32
//! bytes, but any bound wider than 8 bytes is rejected as `Decode` instead of
//! being truncated.

use rlp::{DecoderError, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use bridge_types::{BridgeError, ChainRange};

/// Decoded range arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeArgs {
    pub source_begin: u64,
    pub source_end: u64,
    pub target_begin: u64,
    pub target_end: u64,
}

impl RangeArgs {
    /// Attach chain identities to the bounds. Fails when a range is inverted.
    pub fn into_ranges(
        self,
        source: (&str, &str),
        target: (&str, &str),
    ) -> Result<[ChainRange; 2], BridgeError> {
        Ok([
            ChainRange::new(source.0, source.1, self.source_begin, self.source_end)?,
            ChainRange::new(target.0, target.1, self.target_begin, self.target_end)?,
        ])
    }
}

impl From<&[ChainRange; 2]> for RangeArgs {
    fn from(chains: &[ChainRange; 2]) -> Self {
        Self {
            source_begin: chains[0].begin_block_num,
            source_end: chains[0].end_block_num,
            target_begin: chains[1].begin_block_num,
            target_end: chains[1].end_block_num,
        }
    }
}

/// RLP-encode `[source_begin, source_end, target_begin, target_end]`.
pub fn encode_range_args(chains: &[ChainRange; 2]) -> Vec<u8> {
    let args = RangeArgs::from(chains);
    let mut stream = RlpStream::new_list(4);
    stream
        .append(&args.source_begin)
        .append(&args.source_end)
        .append(&args.target_begin)
        .append(&args.target_end);
    stream.out().to_vec()
}

fn rlp_error(context: &str, e: DecoderError) -> BridgeError {
    BridgeError::Decode(format!("range args {context}: {e}"))
}

/// Decode range arguments. Trailing bytes, wrong arity or integers wider than
/// 64 bits fail with `Decode`.
pub fn decode_range_args(data: &[u8]) -> Result<RangeArgs, BridgeError> {
    let rlp = Rlp::new(data);
    if !rlp.is_list() {
        return Err(BridgeError::Decode("range args must be an RLP list".into()));
    }

    let info = rlp.payload_info().map_err(|e| rlp_error("header", e))?;
    if info.header_len + info.value_len != data.len() {
        return Err(BridgeError::Decode(format!(
            "range args length {} does not match header length {}",
            data.len(),
            info.header_len + info.value_len
        )));
    }

    let item_count = rlp.item_count().map_err(|e| rlp_error("item count", e))?;
    if item_count != 4 {
        return Err(BridgeError::Decode(format!(
            "range args must have 4 items, got {item_count}"
        )));
    }

    let field = |index: usize| -> Result<u64, BridgeError> {
        rlp.val_at::<u64>(index)
            .map_err(|e| rlp_error(&format!("item {index}"), e))
    };

    Ok(RangeArgs {
        source_begin: field(0)?,
        source_end: field(1)?,
        target_begin: field(2)?,
        target_end: field(3)?,
    })
}

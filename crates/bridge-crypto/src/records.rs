//! Constructors for records whose identifiers are derived by the hash codec.
//! Callers never supply `bridge_tx_id`, `swap_tx_hash` or `token_id`.

use bridge_types::hex::to_hex;
use bridge_types::{
    Address, BridgeError, BridgeTx, BridgeTxKind, Hash, SwapDetails, TokenInfo, TxBase, U256,
};

use crate::hash_codec::{bridge_tx_id, swap_tx_hash, token_id};

/// Swap-only inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    pub from: Address,
    pub reward: U256,
    pub amount_out: U256,
    pub swap_count: U256,
}

/// Build a swap record, enforcing `amount == reward + amount_out`.
pub fn new_swap_tx(base: TxBase, params: SwapParams) -> Result<BridgeTx, BridgeError> {
    let total = params.reward.checked_add(params.amount_out);
    if total != Some(base.amount) {
        return Err(BridgeError::InvariantViolation(format!(
            "swap amount {} != reward {} + amount_out {}",
            base.amount, params.reward, params.amount_out
        )));
    }

    let swap_tx_hash = swap_tx_hash(&base, &params.amount_out, &params.swap_count);
    Ok(BridgeTx {
        bridge_tx_id: bridge_tx_id(&base),
        kind: BridgeTxKind::Swap(SwapDetails {
            swap_tx_hash,
            from: params.from,
            reward: params.reward,
            amount_out: params.amount_out,
            swap_count: params.swap_count,
        }),
        base,
    })
}

/// Build a claim record.
pub fn new_claim_tx(base: TxBase) -> BridgeTx {
    BridgeTx {
        bridge_tx_id: bridge_tx_id(&base),
        kind: BridgeTxKind::Claim,
        base,
    }
}

/// Re-derive a swap's identifiers and check its amount split.
pub fn check_bridge_tx(tx: &BridgeTx) -> Result<(), BridgeError> {
    if tx.bridge_tx_id != bridge_tx_id(&tx.base) {
        return Err(BridgeError::InvariantViolation("bridge_tx_id mismatch".into()));
    }
    if let BridgeTxKind::Swap(details) = &tx.kind {
        if details.reward.checked_add(details.amount_out) != Some(tx.base.amount) {
            return Err(BridgeError::InvariantViolation(
                "swap amount != reward + amount_out".into(),
            ));
        }
        if details.swap_tx_hash != swap_tx_hash(&tx.base, &details.amount_out, &details.swap_count) {
            return Err(BridgeError::InvariantViolation("swap_tx_hash mismatch".into()));
        }
    }
    Ok(())
}

/// Token id of a registration, from its chain identity and token address.
pub fn token_info_id(info: &TokenInfo) -> Hash {
    token_id(&info.chain_name, &info.chain_id, &to_hex(&info.token_addr))
}

// crates/tessera-rpc/src/handlers/swap.rs
//
// Swap handlers: Execute, CrossChain, and the fee/reserve reads.

use serde::{Deserialize, Serialize};

use tessera_core::amount::{decimal, U256};
use tessera_economics::{FeePolicy, SwapOutcome};

use super::{
    ledger_error, parse_address, parse_amount_field, parse_asset, AmountResponse, SharedEngine,
};

// ---------------------------------------------------------------------------
// Execute
// ---------------------------------------------------------------------------

/// Request to swap one asset for another at 1:1 minus fees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub caller: String,
    pub asset_in: String,
    pub asset_out: String,
    pub amount_in: String,
    /// Receiver of the output. Defaults to the caller.
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Handle a swap/execute request.
pub async fn handle_swap(
    engine: &SharedEngine,
    request: SwapRequest,
) -> Result<SwapOutcome, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset_in = parse_asset("asset_in", &request.asset_in)?;
    let asset_out = parse_asset("asset_out", &request.asset_out)?;
    let amount_in = parse_amount_field("amount_in", &request.amount_in)?;
    let recipient = match &request.recipient {
        Some(r) => parse_address("recipient", r)?,
        None => caller,
    };

    engine
        .lock()
        .await
        .swap(caller, asset_in, asset_out, amount_in, recipient)
        .map_err(ledger_error)
}

// ---------------------------------------------------------------------------
// CrossChain
// ---------------------------------------------------------------------------

/// Request to swap with the output released on another chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossChainSwapRequest {
    pub caller: String,
    pub asset_in: String,
    pub asset_out: String,
    pub amount_in: String,
    /// Receiver on the destination chain.
    pub recipient: String,
    pub dest_chain: u64,
}

/// Handle a swap/cross_chain request.
pub async fn handle_cross_chain_swap(
    engine: &SharedEngine,
    request: CrossChainSwapRequest,
) -> Result<SwapOutcome, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset_in = parse_asset("asset_in", &request.asset_in)?;
    let asset_out = parse_asset("asset_out", &request.asset_out)?;
    let amount_in = parse_amount_field("amount_in", &request.amount_in)?;
    let recipient = parse_address("recipient", &request.recipient)?;

    engine
        .lock()
        .await
        .cross_chain_swap(
            caller,
            asset_in,
            asset_out,
            amount_in,
            recipient,
            request.dest_chain,
        )
        .map_err(ledger_error)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Request for the lifetime fees of two assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatedFeesRequest {
    pub asset_a: String,
    pub asset_b: String,
}

/// Lifetime fees per asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatedFeesResponse {
    #[serde(with = "decimal")]
    pub fee_a: U256,
    #[serde(with = "decimal")]
    pub fee_b: U256,
}

/// Handle a swap/accumulated_fees request.
pub async fn handle_accumulated_fees(
    engine: &SharedEngine,
    request: AccumulatedFeesRequest,
) -> Result<AccumulatedFeesResponse, String> {
    let asset_a = parse_asset("asset_a", &request.asset_a)?;
    let asset_b = parse_asset("asset_b", &request.asset_b)?;
    let (fee_a, fee_b) = engine
        .lock()
        .await
        .accumulated_fees(asset_a, asset_b)
        .map_err(ledger_error)?;
    Ok(AccumulatedFeesResponse { fee_a, fee_b })
}

/// Request for one asset's reserve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub asset: String,
}

/// Handle a swap/reserve request.
pub async fn handle_reserve(
    engine: &SharedEngine,
    request: ReserveRequest,
) -> Result<AmountResponse, String> {
    let asset = parse_asset("asset", &request.asset)?;
    engine
        .lock()
        .await
        .reserve_of(asset)
        .map(AmountResponse::from)
        .map_err(ledger_error)
}

/// Request for the fee policy of an ordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeePolicyRequest {
    pub asset_in: String,
    pub asset_out: String,
}

/// Handle a swap/fee_policy request.
pub async fn handle_fee_policy(
    engine: &SharedEngine,
    request: FeePolicyRequest,
) -> Result<FeePolicy, String> {
    let asset_in = parse_asset("asset_in", &request.asset_in)?;
    let asset_out = parse_asset("asset_out", &request.asset_out)?;
    engine
        .lock()
        .await
        .fee_policy(asset_in, asset_out)
        .map_err(ledger_error)
}

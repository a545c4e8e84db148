// crates/tessera-rpc/src/handlers/admin.rs
//
// Admin handlers: SetFeePolicy, FundReserve, WithdrawReserve.
// The engine rejects every caller except the configured admin address.

use serde::{Deserialize, Serialize};

use super::{
    ledger_error, parse_address, parse_amount_field, parse_asset, AmountResponse, SharedEngine,
};

// ---------------------------------------------------------------------------
// SetFeePolicy
// ---------------------------------------------------------------------------

/// Request to set the fees for both directions of a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFeePolicyRequest {
    pub caller: String,
    pub asset_a: String,
    pub asset_b: String,
    /// WAD fraction charged entering A -> B (decimal string, 1e18 = 100%).
    pub in_fee: String,
    /// WAD fraction charged exiting A -> B.
    pub out_fee: String,
}

/// Acknowledgement for operations with nothing else to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// Handle an admin/set_fee_policy request.
pub async fn handle_set_fee_policy(
    engine: &SharedEngine,
    request: SetFeePolicyRequest,
) -> Result<AckResponse, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset_a = parse_asset("asset_a", &request.asset_a)?;
    let asset_b = parse_asset("asset_b", &request.asset_b)?;
    let in_fee = parse_amount_field("in_fee", &request.in_fee)?;
    let out_fee = parse_amount_field("out_fee", &request.out_fee)?;

    engine
        .lock()
        .await
        .set_fee_policy(caller, asset_a, asset_b, in_fee, out_fee)
        .map_err(ledger_error)?;
    Ok(AckResponse {
        success: true,
        message: format!("Fee policy set for {} <-> {}", asset_a, asset_b),
    })
}

// ---------------------------------------------------------------------------
// FundReserve / WithdrawReserve
// ---------------------------------------------------------------------------

/// Request to add liquidity from the admin's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundReserveRequest {
    pub caller: String,
    pub asset: String,
    pub amount: String,
}

/// Request to remove liquidity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawReserveRequest {
    pub caller: String,
    pub asset: String,
    pub amount: String,
    /// Receiver of the withdrawn funds. Defaults to the caller.
    #[serde(default)]
    pub to: Option<String>,
}

/// Handle an admin/fund_reserve request. Returns the new reserve.
pub async fn handle_fund_reserve(
    engine: &SharedEngine,
    request: FundReserveRequest,
) -> Result<AmountResponse, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset = parse_asset("asset", &request.asset)?;
    let amount = parse_amount_field("amount", &request.amount)?;

    let mut engine = engine.lock().await;
    engine
        .fund_reserve(caller, asset, amount)
        .map_err(ledger_error)?;
    engine
        .reserve_of(asset)
        .map(AmountResponse::from)
        .map_err(ledger_error)
}

/// Handle an admin/withdraw_reserve request. Returns the new reserve.
pub async fn handle_withdraw_reserve(
    engine: &SharedEngine,
    request: WithdrawReserveRequest,
) -> Result<AmountResponse, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset = parse_asset("asset", &request.asset)?;
    let amount = parse_amount_field("amount", &request.amount)?;
    let to = match &request.to {
        Some(to) => parse_address("to", to)?,
        None => caller,
    };

    let mut engine = engine.lock().await;
    engine
        .withdraw_reserve(caller, asset, amount, to)
        .map_err(ledger_error)?;
    engine
        .reserve_of(asset)
        .map(AmountResponse::from)
        .map_err(ledger_error)
}

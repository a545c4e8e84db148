// crates/tessera-rpc/src/handlers/staking.rs
//
// Staking handlers: Stake, Unstake, Claim, and the reward ledger reads.

use serde::{Deserialize, Serialize};

use tessera_core::amount::{decimal, U256};

use super::{
    ledger_error, parse_address, parse_amount_field, parse_asset, AmountResponse, SharedEngine,
};

// ---------------------------------------------------------------------------
// Stake / Unstake
// ---------------------------------------------------------------------------

/// Request to stake or unstake an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeRequest {
    /// Hex-encoded address of the staker.
    pub caller: String,
    /// Hex-encoded asset identifier.
    pub asset: String,
    /// Decimal amount in base units.
    pub amount: String,
}

/// Response from a stake or unstake operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeResponse {
    /// The caller's stake after the operation.
    #[serde(with = "decimal")]
    pub staked: U256,
    /// Rewards paid out while settling the previous position.
    #[serde(with = "decimal")]
    pub reward_paid: U256,
}

/// Handle a Stake request.
pub async fn handle_stake(
    engine: &SharedEngine,
    request: StakeRequest,
) -> Result<StakeResponse, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset = parse_asset("asset", &request.asset)?;
    let amount = parse_amount_field("amount", &request.amount)?;

    let mut engine = engine.lock().await;
    let reward_paid = engine.stake(caller, asset, amount).map_err(ledger_error)?;
    let staked = engine.user_staked(asset, caller).map_err(ledger_error)?;
    Ok(StakeResponse {
        staked,
        reward_paid,
    })
}

/// Handle an Unstake request.
pub async fn handle_unstake(
    engine: &SharedEngine,
    request: StakeRequest,
) -> Result<StakeResponse, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset = parse_asset("asset", &request.asset)?;
    let amount = parse_amount_field("amount", &request.amount)?;

    let mut engine = engine.lock().await;
    let reward_paid = engine.unstake(caller, asset, amount).map_err(ledger_error)?;
    let staked = engine.user_staked(asset, caller).map_err(ledger_error)?;
    Ok(StakeResponse {
        staked,
        reward_paid,
    })
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// Request to claim pending rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub caller: String,
    pub asset: String,
}

/// Handle a Claim request. Returns the amount paid, possibly zero.
pub async fn handle_claim(
    engine: &SharedEngine,
    request: ClaimRequest,
) -> Result<AmountResponse, String> {
    let caller = parse_address("caller", &request.caller)?;
    let asset = parse_asset("asset", &request.asset)?;
    let mut engine = engine.lock().await;
    engine
        .claim_rewards(caller, asset)
        .map(AmountResponse::from)
        .map_err(ledger_error)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Pool-level query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolQuery {
    pub asset: String,
}

/// Per-user query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionQuery {
    pub asset: String,
    pub user: String,
}

/// Pool-level amount reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolField {
    TotalStaked,
    LastMineAmount,
    TotalK,
    TotalClaimed,
}

/// Per-user amount reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionField {
    UserStaked,
    UserK,
    UserClaimed,
    UserShare,
    PendingRewards,
}

/// Handle a pool-level read.
pub async fn handle_pool_read(
    engine: &SharedEngine,
    field: PoolField,
    request: PoolQuery,
) -> Result<AmountResponse, String> {
    let asset = parse_asset("asset", &request.asset)?;
    let engine = engine.lock().await;
    let amount = match field {
        PoolField::TotalStaked => engine.total_staked(asset),
        PoolField::LastMineAmount => engine.last_mine_amount(asset),
        PoolField::TotalK => engine.total_k(asset),
        PoolField::TotalClaimed => engine.total_claimed(asset),
    };
    amount.map(AmountResponse::from).map_err(ledger_error)
}

/// Handle a per-user read.
pub async fn handle_position_read(
    engine: &SharedEngine,
    field: PositionField,
    request: PositionQuery,
) -> Result<AmountResponse, String> {
    let asset = parse_asset("asset", &request.asset)?;
    let user = parse_address("user", &request.user)?;
    let engine = engine.lock().await;
    let amount = match field {
        PositionField::UserStaked => engine.user_staked(asset, user),
        PositionField::UserK => engine.user_k(asset, user),
        PositionField::UserClaimed => engine.user_claimed(asset, user),
        PositionField::UserShare => engine.user_share(asset, user),
        PositionField::PendingRewards => engine.pending_rewards(asset, user),
    };
    amount.map(AmountResponse::from).map_err(ledger_error)
}

/// Response from a consistency check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyResponse {
    pub asset: String,
    pub consistent: bool,
}

/// Handle a VerifyConsistency request.
pub async fn handle_verify_consistency(
    engine: &SharedEngine,
    request: PoolQuery,
) -> Result<ConsistencyResponse, String> {
    let asset = parse_asset("asset", &request.asset)?;
    let consistent = engine
        .lock()
        .await
        .verify_consistency(asset)
        .map_err(ledger_error)?;
    Ok(ConsistencyResponse {
        asset: asset.to_string(),
        consistent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{engine, ALICE, USDC};

    fn stake_request(amount: &str) -> StakeRequest {
        StakeRequest {
            caller: ALICE.to_string(),
            asset: USDC.to_string(),
            amount: amount.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stake_then_read() {
        let engine = engine();
        let resp = handle_stake(&engine, stake_request("250")).await.unwrap();
        assert_eq!(resp.staked, U256::new(250));
        assert_eq!(resp.reward_paid, U256::ZERO);

        let total = handle_pool_read(
            &engine,
            PoolField::TotalStaked,
            PoolQuery {
                asset: USDC.to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(total.amount, U256::new(250));

        let share = handle_position_read(
            &engine,
            PositionField::UserShare,
            PositionQuery {
                asset: USDC.to_string(),
                user: ALICE.to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(share.amount, U256::new(1_000_000_000_000_000_000));
    }

    #[tokio::test]
    async fn test_over_unstake_reports_ledger_error() {
        let engine = engine();
        handle_stake(&engine, stake_request("10")).await.unwrap();
        let err = handle_unstake(&engine, stake_request("11")).await.unwrap_err();
        assert!(err.contains("Insufficient stake"), "{}", err);
    }

    #[tokio::test]
    async fn test_bad_amount_is_rejected_before_locking() {
        let engine = engine();
        let err = handle_stake(&engine, stake_request("ten")).await.unwrap_err();
        assert!(err.starts_with("Invalid amount"));
    }

    #[tokio::test]
    async fn test_verify_consistency_on_empty_pool() {
        let engine = engine();
        let resp = handle_verify_consistency(
            &engine,
            PoolQuery {
                asset: USDC.to_string(),
            },
        )
        .await
        .unwrap();
        assert!(resp.consistent);
    }
}

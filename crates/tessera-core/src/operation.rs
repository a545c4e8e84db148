// crates/tessera-core/src/operation.rs
//
// Stable operation selectors.
//
// Every public ledger operation has a fixed method name (e.g.
// "staking/stake") and a 4-byte selector derived from it. A router can
// dispatch by either without knowing anything about the implementation.
// Names must never change once published; add new variants instead.

use serde::{Deserialize, Serialize};

use crate::crypto::hash_bytes;
use crate::error::LedgerError;

/// Every operation exposed to the router/admin layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    // Reward ledger (mutating)
    Stake,
    Unstake,
    ClaimRewards,
    // Reward ledger (read-only)
    TotalStaked,
    UserStaked,
    LastMineAmount,
    TotalK,
    UserK,
    TotalClaimed,
    UserClaimed,
    UserShare,
    PendingRewards,
    VerifyConsistency,
    // Fee/reserve ledger
    Swap,
    CrossChainSwap,
    AccumulatedFees,
    Reserve,
    FeePolicy,
    // Admin
    SetFeePolicy,
    FundReserve,
    WithdrawReserve,
    // Event log
    ListEvents,
}

impl Operation {
    /// All operations, in selector-table order.
    pub const ALL: [Operation; 22] = [
        Operation::Stake,
        Operation::Unstake,
        Operation::ClaimRewards,
        Operation::TotalStaked,
        Operation::UserStaked,
        Operation::LastMineAmount,
        Operation::TotalK,
        Operation::UserK,
        Operation::TotalClaimed,
        Operation::UserClaimed,
        Operation::UserShare,
        Operation::PendingRewards,
        Operation::VerifyConsistency,
        Operation::Swap,
        Operation::CrossChainSwap,
        Operation::AccumulatedFees,
        Operation::Reserve,
        Operation::FeePolicy,
        Operation::SetFeePolicy,
        Operation::FundReserve,
        Operation::WithdrawReserve,
        Operation::ListEvents,
    ];

    /// The published method name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Stake => "staking/stake",
            Operation::Unstake => "staking/unstake",
            Operation::ClaimRewards => "staking/claim",
            Operation::TotalStaked => "staking/total_staked",
            Operation::UserStaked => "staking/user_staked",
            Operation::LastMineAmount => "staking/last_mine_amount",
            Operation::TotalK => "staking/total_k",
            Operation::UserK => "staking/user_k",
            Operation::TotalClaimed => "staking/total_claimed",
            Operation::UserClaimed => "staking/user_claimed",
            Operation::UserShare => "staking/user_share",
            Operation::PendingRewards => "staking/pending_rewards",
            Operation::VerifyConsistency => "staking/verify_consistency",
            Operation::Swap => "swap/execute",
            Operation::CrossChainSwap => "swap/cross_chain",
            Operation::AccumulatedFees => "swap/accumulated_fees",
            Operation::Reserve => "swap/reserve",
            Operation::FeePolicy => "swap/fee_policy",
            Operation::SetFeePolicy => "admin/set_fee_policy",
            Operation::FundReserve => "admin/fund_reserve",
            Operation::WithdrawReserve => "admin/withdraw_reserve",
            Operation::ListEvents => "events/list",
        }
    }

    /// First four bytes of SHA-256 over the method name.
    pub fn selector(&self) -> [u8; 4] {
        let digest = hash_bytes(self.name().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Whether the operation can change ledger state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::Stake
                | Operation::Unstake
                | Operation::ClaimRewards
                | Operation::Swap
                | Operation::CrossChainSwap
                | Operation::SetFeePolicy
                | Operation::FundReserve
                | Operation::WithdrawReserve
        )
    }

    /// Resolve a method name.
    ///
    /// # Errors
    /// Returns `LedgerError::ImplementationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, LedgerError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| LedgerError::ImplementationNotFound {
                selector: name.to_string(),
            })
    }

    /// Resolve a 4-byte selector.
    ///
    /// # Errors
    /// Returns `LedgerError::ImplementationNotFound` for unknown selectors.
    pub fn from_selector(selector: [u8; 4]) -> Result<Self, LedgerError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.selector() == selector)
            .ok_or_else(|| LedgerError::ImplementationNotFound {
                selector: format!("0x{}", hex::encode(selector)),
            })
    }
}

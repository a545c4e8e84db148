// crates/tessera-core/src/events.rs
//
// Append-only ledger events.
//
// Each committed operation emits one or more typed records describing its
// effect. Events are indexed by asset and user so external clients can
// query them without replaying state.

use serde::{Deserialize, Serialize};

use crate::address::{Address, Asset};
use crate::amount::{decimal, U256};

/// A typed record of a committed operation's effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    Staked {
        user: Address,
        asset: Asset,
        #[serde(with = "decimal")]
        amount: U256,
    },
    Unstaked {
        user: Address,
        asset: Asset,
        #[serde(with = "decimal")]
        amount: U256,
    },
    RewardsClaimed {
        user: Address,
        asset: Asset,
        #[serde(with = "decimal")]
        amount: U256,
    },
    SwapExecuted {
        sender: Address,
        recipient: Address,
        asset_in: Asset,
        asset_out: Asset,
        #[serde(with = "decimal")]
        amount_in: U256,
        #[serde(with = "decimal")]
        amount_out: U256,
        #[serde(with = "decimal")]
        in_fee: U256,
        #[serde(with = "decimal")]
        out_fee: U256,
    },
    SwapToOtherChain {
        sender: Address,
        recipient: Address,
        asset_in: Asset,
        asset_out: Asset,
        #[serde(with = "decimal")]
        amount_in: U256,
        #[serde(with = "decimal")]
        amount_out: U256,
        #[serde(with = "decimal")]
        in_fee: U256,
        source_chain: u64,
        dest_chain: u64,
    },
    TokenPairFeesSet {
        asset_a: Asset,
        asset_b: Asset,
        #[serde(with = "decimal")]
        in_fee: U256,
        #[serde(with = "decimal")]
        out_fee: U256,
    },
    ReserveFunded {
        funder: Address,
        asset: Asset,
        #[serde(with = "decimal")]
        amount: U256,
    },
    ReserveWithdrawn {
        recipient: Address,
        asset: Asset,
        #[serde(with = "decimal")]
        amount: U256,
    },
}

impl LedgerEvent {
    /// Stable short name, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Staked { .. } => "Staked",
            LedgerEvent::Unstaked { .. } => "Unstaked",
            LedgerEvent::RewardsClaimed { .. } => "RewardsClaimed",
            LedgerEvent::SwapExecuted { .. } => "SwapExecuted",
            LedgerEvent::SwapToOtherChain { .. } => "SwapToOtherChain",
            LedgerEvent::TokenPairFeesSet { .. } => "TokenPairFeesSet",
            LedgerEvent::ReserveFunded { .. } => "ReserveFunded",
            LedgerEvent::ReserveWithdrawn { .. } => "ReserveWithdrawn",
        }
    }

    /// Whether this event touches the given asset.
    pub fn involves_asset(&self, asset: &Asset) -> bool {
        match self {
            LedgerEvent::Staked { asset: a, .. }
            | LedgerEvent::Unstaked { asset: a, .. }
            | LedgerEvent::RewardsClaimed { asset: a, .. }
            | LedgerEvent::ReserveFunded { asset: a, .. }
            | LedgerEvent::ReserveWithdrawn { asset: a, .. } => a == asset,
            LedgerEvent::SwapExecuted {
                asset_in, asset_out, ..
            }
            | LedgerEvent::SwapToOtherChain {
                asset_in, asset_out, ..
            } => asset_in == asset || asset_out == asset,
            LedgerEvent::TokenPairFeesSet {
                asset_a, asset_b, ..
            } => asset_a == asset || asset_b == asset,
        }
    }

    /// Whether this event names the given account as a participant.
    pub fn involves_user(&self, user: &Address) -> bool {
        match self {
            LedgerEvent::Staked { user: u, .. }
            | LedgerEvent::Unstaked { user: u, .. }
            | LedgerEvent::RewardsClaimed { user: u, .. } => u == user,
            LedgerEvent::SwapExecuted {
                sender, recipient, ..
            }
            | LedgerEvent::SwapToOtherChain {
                sender, recipient, ..
            } => sender == user || recipient == user,
            LedgerEvent::ReserveFunded { funder, .. } => funder == user,
            LedgerEvent::ReserveWithdrawn { recipient, .. } => recipient == user,
            LedgerEvent::TokenPairFeesSet { .. } => false,
        }
    }
}

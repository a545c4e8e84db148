// crates/tessera-core/src/traits.rs

use serde::{Deserialize, Serialize};

use crate::address::{Address, Asset};
use crate::amount::{decimal, U256};
use crate::error::LedgerError;
use crate::slot::SlotKey;

/// One movement of a fungible balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferLeg {
    /// `from` moves its own balance to `to`.
    Transfer {
        asset: Asset,
        from: Address,
        to: Address,
        #[serde(with = "decimal")]
        amount: U256,
    },
    /// `spender` moves `owner`'s balance to `to`, consuming allowance.
    TransferFrom {
        asset: Asset,
        spender: Address,
        owner: Address,
        to: Address,
        #[serde(with = "decimal")]
        amount: U256,
    },
}

impl TransferLeg {
    pub fn asset(&self) -> Asset {
        match self {
            TransferLeg::Transfer { asset, .. } | TransferLeg::TransferFrom { asset, .. } => *asset,
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            TransferLeg::Transfer { amount, .. } | TransferLeg::TransferFrom { amount, .. } => {
                *amount
            }
        }
    }
}

/// External fungible-balance capability (transfer, transferFrom, approve).
///
/// The ledger never moves balances one leg at a time. It collects the legs
/// of an operation, asks `check_batch` whether all of them would succeed,
/// and only then commits its own state and calls `settle`.
pub trait AssetTransfer: Send + Sync {
    /// Current balance of `holder`.
    fn balance_of(&self, asset: &Asset, holder: &Address) -> Result<U256, LedgerError>;

    /// Amount `spender` may still move out of `owner`.
    fn allowance(
        &self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, LedgerError>;

    /// Move `amount` of `from`'s balance to `to`.
    fn transfer(
        &mut self,
        asset: &Asset,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Move `amount` of `owner`'s balance to `to` on behalf of `spender`.
    fn transfer_from(
        &mut self,
        asset: &Asset,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Set the allowance of `spender` over `owner`'s balance.
    fn approve(
        &mut self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Verify that every leg, applied in order, would succeed.
    /// Must not change any balance.
    fn check_batch(&self, legs: &[TransferLeg]) -> Result<(), LedgerError>;

    /// Slot writes that settle `legs`, for banks kept in the ledger's own
    /// slot store. The engine lands them in the same batch as the ledger
    /// writes and then skips `settle`. `None` means the bank settles itself.
    fn stage_settlement(
        &self,
        legs: &[TransferLeg],
    ) -> Result<Option<Vec<(SlotKey, U256)>>, LedgerError> {
        let _ = legs;
        Ok(None)
    }

    /// Apply a batch that has passed `check_batch`.
    fn settle(&mut self, legs: &[TransferLeg]) -> Result<(), LedgerError> {
        for leg in legs {
            match leg {
                TransferLeg::Transfer {
                    asset,
                    from,
                    to,
                    amount,
                } => self.transfer(asset, from, to, *amount)?,
                TransferLeg::TransferFrom {
                    asset,
                    spender,
                    owner,
                    to,
                    amount,
                } => self.transfer_from(asset, spender, owner, to, *amount)?,
            }
        }
        Ok(())
    }
}

/// A request to release the output leg of a swap on another chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub asset_in: Asset,
    pub asset_out: Asset,
    pub from: Address,
    pub to: Address,
    pub source_chain: u64,
    pub dest_chain: u64,
    #[serde(with = "decimal")]
    pub amount: U256,
}

/// Cross-chain bridge collaborator.
///
/// Same two-phase contract as `AssetTransfer`: `check_exit` validates
/// without side effects, `exit` must succeed for a checked request.
pub trait Bridge: Send + Sync {
    /// Validate chain identifiers and the request shape.
    fn check_exit(&self, request: &ExitRequest) -> Result<(), LedgerError>;

    /// Forward the exit instruction.
    fn exit(&mut self, request: ExitRequest) -> Result<(), LedgerError>;
}

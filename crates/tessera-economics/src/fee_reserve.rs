// crates/tessera-economics/src/fee_reserve.rs
//
// Fee/reserve ledger for the fixed-ratio stablecoin exchange.
//
// Swaps are 1:1 minus fees, not a constant-product curve:
//   in_fee     = amount_in * policy.in_fee  / 1e18
//   out_fee    = amount_in * policy.out_fee / 1e18
//   amount_out = amount_in - out_fee
//
// Fees are accumulated per asset (in_fee on the input asset, out_fee on the
// output asset). The per-asset lifetime accumulator is the income source
// the reward ledger distributes to stakers.

use serde::{Deserialize, Serialize};

use tessera_core::address::{Address, Asset};
use tessera_core::amount::{apply_rate, checked_add, decimal, U256, WAD};
use tessera_core::error::LedgerError;
use tessera_core::events::LedgerEvent;
use tessera_core::traits::{ExitRequest, TransferLeg};
use tessera_store::StagedSlots;

use crate::keys;
use crate::rewards::IncomeSource;
use crate::txn::Txn;

/// Fee rates for one direction of an asset pair, as WAD fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeePolicy {
    #[serde(with = "decimal")]
    pub in_fee: U256,
    #[serde(with = "decimal")]
    pub out_fee: U256,
}

/// Result of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    #[serde(with = "decimal")]
    pub amount_out: U256,
    #[serde(with = "decimal")]
    pub in_fee: U256,
    #[serde(with = "decimal")]
    pub out_fee: U256,
}

/// Parameters of a cross-chain swap, beyond the local swap's.
#[derive(Debug, Clone, Copy)]
pub struct ChainRoute {
    pub source_chain: u64,
    pub dest_chain: u64,
}

/// Stateless view over the reserve, fee and policy slots.
///
/// All state lives in the store; this type only knows the layout and the
/// rules. Admin gating happens in the engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeeReserveLedger;

fn validate_pair(asset_in: &Asset, asset_out: &Asset) -> Result<(), LedgerError> {
    if asset_in.is_null() {
        return Err(LedgerError::InvalidAsset { asset: *asset_in });
    }
    if asset_out.is_null() || asset_out == asset_in {
        return Err(LedgerError::InvalidAsset { asset: *asset_out });
    }
    Ok(())
}

fn validate_rate(rate: U256) -> Result<(), LedgerError> {
    if rate > WAD {
        return Err(LedgerError::FeeTooHigh { rate });
    }
    Ok(())
}

impl FeeReserveLedger {
    pub fn new() -> Self {
        Self
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn reserve(&self, slots: &StagedSlots<'_>, asset: &Asset) -> Result<U256, LedgerError> {
        slots.get(&keys::reserve(asset))
    }

    /// Lifetime fee income for one asset.
    pub fn accumulated_fee(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
    ) -> Result<U256, LedgerError> {
        slots.get(&keys::accumulated_fee(asset))
    }

    /// Lifetime fee income for two assets. Fees are tracked per asset, not
    /// per direction, so the pair only selects which two counters to read.
    pub fn accumulated_fees(
        &self,
        slots: &StagedSlots<'_>,
        asset_a: &Asset,
        asset_b: &Asset,
    ) -> Result<(U256, U256), LedgerError> {
        Ok((
            self.accumulated_fee(slots, asset_a)?,
            self.accumulated_fee(slots, asset_b)?,
        ))
    }

    /// Policy for the ordered pair (from -> to). Unset pairs charge nothing.
    pub fn fee_policy(
        &self,
        slots: &StagedSlots<'_>,
        from: &Asset,
        to: &Asset,
    ) -> Result<FeePolicy, LedgerError> {
        Ok(FeePolicy {
            in_fee: slots.get(&keys::in_fee_rate(from, to))?,
            out_fee: slots.get(&keys::out_fee_rate(from, to))?,
        })
    }

    /// Compute a swap's fees and output without touching state.
    pub fn quote(
        &self,
        slots: &StagedSlots<'_>,
        asset_in: &Asset,
        asset_out: &Asset,
        amount_in: U256,
    ) -> Result<SwapOutcome, LedgerError> {
        validate_pair(asset_in, asset_out)?;
        if amount_in == U256::ZERO {
            return Err(LedgerError::InvalidAmount { amount: amount_in });
        }

        let policy = self.fee_policy(slots, asset_in, asset_out)?;
        let in_fee = apply_rate(amount_in, policy.in_fee, "swap in_fee")?;
        let out_fee = apply_rate(amount_in, policy.out_fee, "swap out_fee")?;

        Ok(SwapOutcome {
            // out_fee <= amount_in because rates are capped at 1e18.
            amount_out: amount_in - out_fee,
            in_fee,
            out_fee,
        })
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store a fee policy for both directions of a pair.
    ///
    /// (A -> B) gets (in_fee, out_fee); (B -> A) gets (out_fee, in_fee),
    /// because the fee charged entering one side is the fee charged exiting
    /// the other.
    pub fn set_fee_policy(
        &self,
        txn: &mut Txn<'_>,
        asset_a: &Asset,
        asset_b: &Asset,
        in_fee: U256,
        out_fee: U256,
    ) -> Result<(), LedgerError> {
        validate_pair(asset_a, asset_b)?;
        validate_rate(in_fee)?;
        validate_rate(out_fee)?;

        txn.set(keys::in_fee_rate(asset_a, asset_b), in_fee);
        txn.set(keys::out_fee_rate(asset_a, asset_b), out_fee);
        txn.set(keys::in_fee_rate(asset_b, asset_a), out_fee);
        txn.set(keys::out_fee_rate(asset_b, asset_a), in_fee);

        txn.emit(LedgerEvent::TokenPairFeesSet {
            asset_a: *asset_a,
            asset_b: *asset_b,
            in_fee,
            out_fee,
        });
        Ok(())
    }

    /// Execute a local swap: pull `amount_in` from `sender` into custody and
    /// pay `amount_out` from custody to `recipient`.
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        sender: &Address,
        asset_in: &Asset,
        asset_out: &Asset,
        amount_in: U256,
        recipient: &Address,
    ) -> Result<SwapOutcome, LedgerError> {
        let outcome = self.quote(txn.slots(), asset_in, asset_out, amount_in)?;

        // Reserve check first: a failing swap must leave nothing staged.
        let reserve_out = txn.get(&keys::reserve(asset_out))?;
        if outcome.amount_out > reserve_out {
            return Err(LedgerError::InsufficientReserve {
                asset: *asset_out,
                requested: outcome.amount_out,
                available: reserve_out,
            });
        }

        self.accrue_fee(txn, asset_in, outcome.in_fee)?;
        self.accrue_fee(txn, asset_out, outcome.out_fee)?;

        let reserve_in = txn.get(&keys::reserve(asset_in))?;
        txn.set(
            keys::reserve(asset_in),
            checked_add(reserve_in, amount_in, "reserve in")?,
        );
        txn.set(keys::reserve(asset_out), reserve_out - outcome.amount_out);

        txn.push_transfer(TransferLeg::TransferFrom {
            asset: *asset_in,
            spender: *custody,
            owner: *sender,
            to: *custody,
            amount: amount_in,
        });
        txn.push_transfer(TransferLeg::Transfer {
            asset: *asset_out,
            from: *custody,
            to: *recipient,
            amount: outcome.amount_out,
        });

        txn.emit(LedgerEvent::SwapExecuted {
            sender: *sender,
            recipient: *recipient,
            asset_in: *asset_in,
            asset_out: *asset_out,
            amount_in,
            amount_out: outcome.amount_out,
            in_fee: outcome.in_fee,
            out_fee: outcome.out_fee,
        });

        Ok(outcome)
    }

    /// Execute a swap whose output leg is released on another chain.
    ///
    /// Only the input-side fee applies; the output asset's local reserve is
    /// untouched because nothing leaves custody on this chain.
    #[allow(clippy::too_many_arguments)]
    pub fn cross_chain_swap(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        sender: &Address,
        asset_in: &Asset,
        asset_out: &Asset,
        amount_in: U256,
        recipient: &Address,
        route: ChainRoute,
    ) -> Result<SwapOutcome, LedgerError> {
        validate_pair(asset_in, asset_out)?;
        if amount_in == U256::ZERO {
            return Err(LedgerError::InvalidAmount { amount: amount_in });
        }

        let policy = self.fee_policy(txn.slots(), asset_in, asset_out)?;
        let in_fee = apply_rate(amount_in, policy.in_fee, "cross-chain in_fee")?;
        let outcome = SwapOutcome {
            amount_out: amount_in - in_fee,
            in_fee,
            out_fee: U256::ZERO,
        };

        self.accrue_fee(txn, asset_in, in_fee)?;
        let reserve_in = txn.get(&keys::reserve(asset_in))?;
        txn.set(
            keys::reserve(asset_in),
            checked_add(reserve_in, amount_in, "reserve in")?,
        );

        txn.push_transfer(TransferLeg::TransferFrom {
            asset: *asset_in,
            spender: *custody,
            owner: *sender,
            to: *custody,
            amount: amount_in,
        });
        txn.push_exit(ExitRequest {
            asset_in: *asset_in,
            asset_out: *asset_out,
            from: *sender,
            to: *recipient,
            source_chain: route.source_chain,
            dest_chain: route.dest_chain,
            amount: outcome.amount_out,
        });

        txn.emit(LedgerEvent::SwapToOtherChain {
            sender: *sender,
            recipient: *recipient,
            asset_in: *asset_in,
            asset_out: *asset_out,
            amount_in,
            amount_out: outcome.amount_out,
            in_fee,
            source_chain: route.source_chain,
            dest_chain: route.dest_chain,
        });

        Ok(outcome)
    }

    /// Add liquidity to an asset's reserve from `funder`.
    pub fn fund_reserve(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        funder: &Address,
        asset: &Asset,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if asset.is_null() {
            return Err(LedgerError::InvalidAsset { asset: *asset });
        }
        if amount == U256::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let reserve = txn.get(&keys::reserve(asset))?;
        txn.set(keys::reserve(asset), checked_add(reserve, amount, "fund reserve")?);
        txn.push_transfer(TransferLeg::TransferFrom {
            asset: *asset,
            spender: *custody,
            owner: *funder,
            to: *custody,
            amount,
        });
        txn.emit(LedgerEvent::ReserveFunded {
            funder: *funder,
            asset: *asset,
            amount,
        });
        Ok(())
    }

    /// Remove liquidity from an asset's reserve to `to`.
    pub fn withdraw_reserve(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        asset: &Asset,
        amount: U256,
        to: &Address,
    ) -> Result<(), LedgerError> {
        if asset.is_null() {
            return Err(LedgerError::InvalidAsset { asset: *asset });
        }
        if amount == U256::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let reserve = txn.get(&keys::reserve(asset))?;
        if amount > reserve {
            return Err(LedgerError::InsufficientReserve {
                asset: *asset,
                requested: amount,
                available: reserve,
            });
        }
        txn.set(keys::reserve(asset), reserve - amount);
        txn.push_transfer(TransferLeg::Transfer {
            asset: *asset,
            from: *custody,
            to: *to,
            amount,
        });
        txn.emit(LedgerEvent::ReserveWithdrawn {
            recipient: *to,
            asset: *asset,
            amount,
        });
        Ok(())
    }

    fn accrue_fee(&self, txn: &mut Txn<'_>, asset: &Asset, fee: U256) -> Result<(), LedgerError> {
        if fee == U256::ZERO {
            return Ok(());
        }
        let current = txn.get(&keys::accumulated_fee(asset))?;
        txn.set(
            keys::accumulated_fee(asset),
            checked_add(current, fee, "accumulated fee")?,
        );
        Ok(())
    }
}

impl IncomeSource for FeeReserveLedger {
    fn accumulated_income(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
    ) -> Result<U256, LedgerError> {
        self.accumulated_fee(slots, asset)
    }

    /// Collected fees sit in the reserve of the asset they were charged in,
    /// so a reward payout comes out of that reserve.
    fn draw_income(&self, txn: &mut Txn<'_>, asset: &Asset, amount: U256) -> Result<(), LedgerError> {
        let reserve = txn.get(&keys::reserve(asset))?;
        if amount > reserve {
            return Err(LedgerError::InsufficientReserve {
                asset: *asset,
                requested: amount,
                available: reserve,
            });
        }
        txn.set(keys::reserve(asset), reserve - amount);
        Ok(())
    }
}

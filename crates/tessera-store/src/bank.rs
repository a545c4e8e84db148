// crates/tessera-store/src/bank.rs
//
// InMemoryBank: reference implementation of the external asset-transfer
// capability, plus the batch simulation shared with the RocksDB-backed bank.
//
// Batches are simulated on scratch copies of the touched entries first, so
// `settle` either applies every leg or none.

use std::collections::HashMap;

use tessera_core::address::{Address, Asset};
use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::slot::SlotKey;
use tessera_core::traits::{AssetTransfer, TransferLeg};

type BalanceKey = (Asset, Address);
type AllowanceKey = (Asset, Address, Address);

const BALANCE: &str = "bank.balance";
const ALLOWANCE: &str = "bank.allowance";
const GENESIS: &str = "bank.genesis";

/// Slot holding `holder`'s balance of `asset` in a slot-backed bank.
pub fn balance_slot(asset: &Asset, holder: &Address) -> SlotKey {
    SlotKey::derive(BALANCE, &[asset.as_bytes(), holder.as_bytes()])
}

/// Slot holding the allowance `spender` has over `owner`'s `asset`.
pub fn allowance_slot(asset: &Asset, owner: &Address, spender: &Address) -> SlotKey {
    SlotKey::derive(
        ALLOWANCE,
        &[asset.as_bytes(), owner.as_bytes(), spender.as_bytes()],
    )
}

/// Marker slot set once genesis grants have been written.
pub fn genesis_slot() -> SlotKey {
    SlotKey::derive(GENESIS, &[])
}

/// One starting balance, optionally approved in full to a spender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisGrant {
    pub asset: Asset,
    pub holder: Address,
    pub amount: U256,
    pub approve: Option<Address>,
}

/// Committed balances and allowances a batch is simulated against.
pub(crate) trait BankState {
    fn stored_balance(&self, asset: &Asset, holder: &Address) -> Result<U256, LedgerError>;

    fn stored_allowance(
        &self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, LedgerError>;
}

/// Scratch state produced by simulating a batch.
#[derive(Debug, Default)]
pub(crate) struct Simulation {
    balances: HashMap<BalanceKey, U256>,
    allowances: HashMap<AllowanceKey, U256>,
}

impl Simulation {
    fn balance(
        &self,
        state: &impl BankState,
        asset: &Asset,
        holder: &Address,
    ) -> Result<U256, LedgerError> {
        match self.balances.get(&(*asset, *holder)) {
            Some(value) => Ok(*value),
            None => state.stored_balance(asset, holder),
        }
    }

    fn credit(
        &mut self,
        state: &impl BankState,
        asset: &Asset,
        holder: &Address,
        amount: U256,
        context: &'static str,
    ) -> Result<(), LedgerError> {
        let credited = self
            .balance(state, asset, holder)?
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow { context })?;
        self.balances.insert((*asset, *holder), credited);
        Ok(())
    }

    fn debit(
        &mut self,
        state: &impl BankState,
        asset: &Asset,
        holder: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.balance(state, asset, holder)?;
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                asset: *asset,
                holder: *holder,
                requested: amount,
                available,
            });
        }
        self.balances.insert((*asset, *holder), available - amount);
        Ok(())
    }

    /// Slot writes for every touched entry.
    pub(crate) fn into_writes(self) -> Vec<(SlotKey, U256)> {
        let mut writes: Vec<(SlotKey, U256)> = self
            .balances
            .into_iter()
            .map(|((asset, holder), value)| (balance_slot(&asset, &holder), value))
            .collect();
        writes.extend(
            self.allowances
                .into_iter()
                .map(|((asset, owner, spender), value)| {
                    (allowance_slot(&asset, &owner, &spender), value)
                }),
        );
        writes
    }
}

/// Apply `legs` in order against scratch copies of the touched entries.
pub(crate) fn simulate(
    state: &impl BankState,
    legs: &[TransferLeg],
) -> Result<Simulation, LedgerError> {
    let mut sim = Simulation::default();

    for leg in legs {
        match leg {
            TransferLeg::Transfer {
                asset,
                from,
                to,
                amount,
            } => {
                sim.debit(state, asset, from, *amount)?;
                sim.credit(state, asset, to, *amount, "bank credit")?;
            }
            TransferLeg::TransferFrom {
                asset,
                spender,
                owner,
                to,
                amount,
            } => {
                let key = (*asset, *owner, *spender);
                let approved = match sim.allowances.get(&key) {
                    Some(value) => *value,
                    None => state.stored_allowance(asset, owner, spender)?,
                };
                if *amount > approved {
                    return Err(LedgerError::InsufficientAllowance {
                        asset: *asset,
                        owner: *owner,
                        spender: *spender,
                        requested: *amount,
                        available: approved,
                    });
                }
                sim.allowances.insert(key, approved - *amount);
                sim.debit(state, asset, owner, *amount)?;
                sim.credit(state, asset, to, *amount, "bank credit")?;
            }
        }
    }

    Ok(sim)
}

/// Credit every grant and record its approval, against scratch state.
pub(crate) fn simulate_genesis(
    state: &impl BankState,
    grants: &[GenesisGrant],
) -> Result<Simulation, LedgerError> {
    let mut sim = Simulation::default();
    for grant in grants {
        sim.credit(state, &grant.asset, &grant.holder, grant.amount, "mint")?;
        if let Some(spender) = grant.approve {
            sim.allowances
                .insert((grant.asset, grant.holder, spender), U256::MAX);
        }
        tracing::debug!(
            asset = %grant.asset,
            holder = %grant.holder,
            amount = %grant.amount,
            "Genesis grant"
        );
    }
    Ok(sim)
}

/// Balances and allowances held in memory. Used by tests and ephemeral nodes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBank {
    balances: HashMap<BalanceKey, U256>,
    allowances: HashMap<AllowanceKey, U256>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank holding exactly the given grants.
    pub fn from_genesis(grants: &[GenesisGrant]) -> Result<Self, LedgerError> {
        let mut bank = Self::new();
        let sim = simulate_genesis(&bank, grants)?;
        bank.commit(sim);
        Ok(bank)
    }

    /// Credit `amount` to `holder` out of thin air. Genesis and test helper.
    pub fn mint(&mut self, asset: &Asset, holder: &Address, amount: U256) -> Result<(), LedgerError> {
        let entry = self.balances.entry((*asset, *holder)).or_insert(U256::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow { context: "mint" })?;
        Ok(())
    }

    fn commit(&mut self, sim: Simulation) {
        self.balances.extend(sim.balances);
        self.allowances.extend(sim.allowances);
    }
}

impl BankState for InMemoryBank {
    fn stored_balance(&self, asset: &Asset, holder: &Address) -> Result<U256, LedgerError> {
        Ok(self
            .balances
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn stored_allowance(
        &self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, LedgerError> {
        Ok(self
            .allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

impl AssetTransfer for InMemoryBank {
    fn balance_of(&self, asset: &Asset, holder: &Address) -> Result<U256, LedgerError> {
        self.stored_balance(asset, holder)
    }

    fn allowance(
        &self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, LedgerError> {
        self.stored_allowance(asset, owner, spender)
    }

    fn transfer(
        &mut self,
        asset: &Asset,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.settle(&[TransferLeg::Transfer {
            asset: *asset,
            from: *from,
            to: *to,
            amount,
        }])
    }

    fn transfer_from(
        &mut self,
        asset: &Asset,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.settle(&[TransferLeg::TransferFrom {
            asset: *asset,
            spender: *spender,
            owner: *owner,
            to: *to,
            amount,
        }])
    }

    fn approve(
        &mut self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.allowances.insert((*asset, *owner, *spender), amount);
        Ok(())
    }

    fn check_batch(&self, legs: &[TransferLeg]) -> Result<(), LedgerError> {
        simulate(self, legs).map(|_| ())
    }

    fn settle(&mut self, legs: &[TransferLeg]) -> Result<(), LedgerError> {
        let sim = simulate(self, legs)?;
        self.commit(sim);
        Ok(())
    }
}

// crates/tessera-store/src/rocks_bank.rs
//
// RocksBank: the asset-transfer capability kept in the same RocksDB as the
// ledger slots.
//
// Balances and allowances are slots under the `bank.*` namespaces. When the
// engine settles a batch, `stage_settlement` hands back the slot writes so
// they land in the ledger's own WriteBatch. A crash can never leave a
// committed ledger state without its transfers, or the reverse.

use std::sync::Arc;

use tessera_core::address::{Address, Asset};
use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::slot::SlotKey;
use tessera_core::traits::{AssetTransfer, TransferLeg};

use crate::bank::{
    allowance_slot, balance_slot, genesis_slot, simulate, simulate_genesis, BankState,
    GenesisGrant,
};
use crate::rocks::{read_slot, write_slots, Db};

/// Bank backed by the ledger's RocksDB. Obtain one with `RocksStore::bank`.
#[derive(Debug, Clone)]
pub struct RocksBank {
    db: Arc<Db>,
}

impl RocksBank {
    pub(crate) fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Write the genesis grants unless a previous start already did.
    ///
    /// Returns `true` if the grants were written by this call.
    pub fn apply_genesis(&mut self, grants: &[GenesisGrant]) -> Result<bool, LedgerError> {
        if read_slot(&self.db, &genesis_slot())? != U256::ZERO {
            tracing::info!("Genesis already applied; keeping persisted balances");
            return Ok(false);
        }
        let mut writes = simulate_genesis(self, grants)?.into_writes();
        writes.push((genesis_slot(), U256::ONE));
        write_slots(&self.db, &writes)?;
        tracing::info!("Applied {} genesis grants", grants.len());
        Ok(true)
    }
}

impl BankState for RocksBank {
    fn stored_balance(&self, asset: &Asset, holder: &Address) -> Result<U256, LedgerError> {
        read_slot(&self.db, &balance_slot(asset, holder))
    }

    fn stored_allowance(
        &self,
        asset: &Asset,
        owner: &Address,
        spender: &Address,
    ) -> Result<U256, LedgerError> {
        read_slot(&self.db, &allowance_slot(asset, owner, spender))
    }
}

impl AssetTransfer for RocksBank {
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
        write_slots(&self.db, &[(allowance_slot(asset, owner, spender), amount)])
    }

    fn check_batch(&self, legs: &[TransferLeg]) -> Result<(), LedgerError> {
        simulate(self, legs).map(|_| ())
    }

    fn stage_settlement(
        &self,
        legs: &[TransferLeg],
    ) -> Result<Option<Vec<(SlotKey, U256)>>, LedgerError> {
        Ok(Some(simulate(self, legs)?.into_writes()))
    }

    fn settle(&mut self, legs: &[TransferLeg]) -> Result<(), LedgerError> {
        let writes = simulate(self, legs)?.into_writes();
        write_slots(&self.db, &writes)
    }
}

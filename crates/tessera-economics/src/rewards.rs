// crates/tessera-economics/src/rewards.rs
//
// Staking reward ledger using a cumulative per-unit income index (K).
//
// For each asset the ledger keeps a pool index K (WAD-scaled reward per
// staked unit). When new income appears it is folded into K:
//
//   K += (total_mined - last_settled_income) * 1e18 / total_staked
//
// A user's pending reward is (K - user_index) * staked / 1e18. Every stake
// change settles the user first and moves user_index up to K, so a user
// never earns from income that arrived before their stake.
//
// Income that arrives while nothing is staked is deferred: neither K nor
// last_settled_income moves, so the first staker after the gap receives it.
//
// Paid rewards are drawn back out of the income source. For swap fees that
// means the reserve holding them, so a fee is never both paid to a staker
// and left available to swaps.

use serde::{Deserialize, Serialize};

use tessera_core::address::{Address, Asset};
use tessera_core::amount::{checked_add, decimal, mul_div, U256, WAD};
use tessera_core::error::LedgerError;
use tessera_core::events::LedgerEvent;
use tessera_core::traits::TransferLeg;
use tessera_store::StagedSlots;

use crate::fee_reserve::FeeReserveLedger;
use crate::keys;
use crate::txn::Txn;

/// Source of lifetime income per asset, distributed to stakers.
///
/// The value must be non-decreasing: the reward ledger only folds in the
/// difference since the last refresh.
pub trait IncomeSource: Send + Sync {
    fn accumulated_income(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
    ) -> Result<U256, LedgerError>;

    /// Remove `amount` of already-distributed income from wherever the
    /// source holds it, ahead of paying it to a staker.
    fn draw_income(&self, txn: &mut Txn<'_>, asset: &Asset, amount: U256) -> Result<(), LedgerError>;
}

/// Pool-level record for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolSnapshot {
    #[serde(with = "decimal")]
    pub total_staked: U256,
    #[serde(with = "decimal")]
    pub cumulative_index: U256,
    #[serde(with = "decimal")]
    pub last_settled_income: U256,
    #[serde(with = "decimal")]
    pub total_claimed: U256,
}

/// One user's position in one asset's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakePosition {
    #[serde(with = "decimal")]
    pub staked_amount: U256,
    #[serde(with = "decimal")]
    pub user_index: U256,
    #[serde(with = "decimal")]
    pub claimed_amount: U256,
}

/// Reward accounting over an income source.
#[derive(Debug, Default, Clone)]
pub struct RewardLedger<I: IncomeSource = FeeReserveLedger> {
    income: I,
}

fn validate_asset(asset: &Asset) -> Result<(), LedgerError> {
    if asset.is_null() {
        return Err(LedgerError::InvalidAsset { asset: *asset });
    }
    Ok(())
}

fn validate_amount(amount: U256) -> Result<(), LedgerError> {
    if amount == U256::ZERO {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}

fn owed(index: U256, user_index: U256, staked: U256) -> Result<U256, LedgerError> {
    if index <= user_index {
        return Ok(U256::ZERO);
    }
    mul_div(index - user_index, staked, WAD, "pending reward")
}

impl<I: IncomeSource> RewardLedger<I> {
    pub fn new(income: I) -> Self {
        Self { income }
    }

    pub fn income(&self) -> &I {
        &self.income
    }

    // -----------------------------------------------------------------------
    // Index maintenance
    // -----------------------------------------------------------------------

    /// K as it would be after folding in all income visible in `slots`.
    ///
    /// Returns the projected index and the income level it corresponds to.
    /// When nothing is staked the index and settled income stay put.
    fn projected_index(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        pool: &PoolSnapshot,
    ) -> Result<(U256, U256), LedgerError> {
        if pool.total_staked == U256::ZERO {
            return Ok((pool.cumulative_index, pool.last_settled_income));
        }
        let mined = self.income.accumulated_income(slots, asset)?;
        if mined <= pool.last_settled_income {
            return Ok((pool.cumulative_index, pool.last_settled_income));
        }
        let delta = mul_div(
            mined - pool.last_settled_income,
            WAD,
            pool.total_staked,
            "pool index delta",
        )?;
        Ok((
            checked_add(pool.cumulative_index, delta, "pool index")?,
            mined,
        ))
    }

    /// Fold any new income into K. Idempotent.
    pub fn refresh_pool_index(&self, txn: &mut Txn<'_>, asset: &Asset) -> Result<U256, LedgerError> {
        let pool = self.pool(txn.slots(), asset)?;
        let (index, settled) = self.projected_index(txn.slots(), asset, &pool)?;
        if index != pool.cumulative_index {
            txn.set(keys::pool_index(asset), index);
        }
        if settled != pool.last_settled_income {
            txn.set(keys::last_settled_income(asset), settled);
        }
        Ok(index)
    }

    /// Bring the user's index up to K and return what they are owed.
    fn settle_user(
        &self,
        txn: &mut Txn<'_>,
        user: &Address,
        asset: &Asset,
    ) -> Result<U256, LedgerError> {
        let index = self.refresh_pool_index(txn, asset)?;
        let position = self.position(txn.slots(), asset, user)?;
        let pending = owed(index, position.user_index, position.staked_amount)?;
        if position.user_index != index {
            txn.set(keys::user_index(asset, user), index);
        }
        Ok(pending)
    }

    /// Pay a settled reward from custody.
    fn pay(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        user: &Address,
        asset: &Asset,
        pending: U256,
    ) -> Result<(), LedgerError> {
        if pending == U256::ZERO {
            return Ok(());
        }

        self.income.draw_income(txn, asset, pending)?;

        let total = txn.get(&keys::total_claimed(asset))?;
        txn.set(
            keys::total_claimed(asset),
            checked_add(total, pending, "total claimed")?,
        );
        let claimed = txn.get(&keys::user_claimed(asset, user))?;
        txn.set(
            keys::user_claimed(asset, user),
            checked_add(claimed, pending, "user claimed")?,
        );

        txn.push_transfer(TransferLeg::Transfer {
            asset: *asset,
            from: *custody,
            to: *user,
            amount: pending,
        });
        txn.emit(LedgerEvent::RewardsClaimed {
            user: *user,
            asset: *asset,
            amount: pending,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Public operations
    // -----------------------------------------------------------------------

    /// Stake `amount` of `asset`. Returns the reward paid out while
    /// settling the previous position.
    pub fn stake(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        user: &Address,
        asset: &Asset,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        validate_asset(asset)?;
        validate_amount(amount)?;

        let pending = self.settle_user(txn, user, asset)?;
        self.pay(txn, custody, user, asset, pending)?;

        let total = txn.get(&keys::total_staked(asset))?;
        let staked = txn.get(&keys::user_staked(asset, user))?;
        txn.set(
            keys::total_staked(asset),
            checked_add(total, amount, "total staked")?,
        );
        txn.set(
            keys::user_staked(asset, user),
            checked_add(staked, amount, "user staked")?,
        );

        txn.push_transfer(TransferLeg::TransferFrom {
            asset: *asset,
            spender: *custody,
            owner: *user,
            to: *custody,
            amount,
        });
        txn.emit(LedgerEvent::Staked {
            user: *user,
            asset: *asset,
            amount,
        });
        Ok(pending)
    }

    /// Withdraw `amount` of a stake. Returns the reward paid out.
    pub fn unstake(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        user: &Address,
        asset: &Asset,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        validate_asset(asset)?;
        validate_amount(amount)?;

        let staked = txn.get(&keys::user_staked(asset, user))?;
        if amount > staked {
            return Err(LedgerError::InsufficientStake {
                requested: amount,
                available: staked,
            });
        }

        let pending = self.settle_user(txn, user, asset)?;
        self.pay(txn, custody, user, asset, pending)?;

        let total = txn.get(&keys::total_staked(asset))?;
        let remaining_total = total
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "total staked underflow",
            })?;
        txn.set(keys::total_staked(asset), remaining_total);
        txn.set(keys::user_staked(asset, user), staked - amount);

        txn.push_transfer(TransferLeg::Transfer {
            asset: *asset,
            from: *custody,
            to: *user,
            amount,
        });
        txn.emit(LedgerEvent::Unstaked {
            user: *user,
            asset: *asset,
            amount,
        });
        Ok(pending)
    }

    /// Pay out whatever the user is owed. Zero is a valid outcome.
    pub fn claim_rewards(
        &self,
        txn: &mut Txn<'_>,
        custody: &Address,
        user: &Address,
        asset: &Asset,
    ) -> Result<U256, LedgerError> {
        validate_asset(asset)?;
        let pending = self.settle_user(txn, user, asset)?;
        self.pay(txn, custody, user, asset, pending)?;
        Ok(pending)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn pool(&self, slots: &StagedSlots<'_>, asset: &Asset) -> Result<PoolSnapshot, LedgerError> {
        Ok(PoolSnapshot {
            total_staked: slots.get(&keys::total_staked(asset))?,
            cumulative_index: slots.get(&keys::pool_index(asset))?,
            last_settled_income: slots.get(&keys::last_settled_income(asset))?,
            total_claimed: slots.get(&keys::total_claimed(asset))?,
        })
    }

    pub fn position(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        user: &Address,
    ) -> Result<StakePosition, LedgerError> {
        Ok(StakePosition {
            staked_amount: slots.get(&keys::user_staked(asset, user))?,
            user_index: slots.get(&keys::user_index(asset, user))?,
            claimed_amount: slots.get(&keys::user_claimed(asset, user))?,
        })
    }

    pub fn total_staked(&self, slots: &StagedSlots<'_>, asset: &Asset) -> Result<U256, LedgerError> {
        slots.get(&keys::total_staked(asset))
    }

    pub fn user_staked(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        user: &Address,
    ) -> Result<U256, LedgerError> {
        slots.get(&keys::user_staked(asset, user))
    }

    /// Income level last folded into K.
    pub fn last_mine_amount(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
    ) -> Result<U256, LedgerError> {
        slots.get(&keys::last_settled_income(asset))
    }

    pub fn total_k(&self, slots: &StagedSlots<'_>, asset: &Asset) -> Result<U256, LedgerError> {
        slots.get(&keys::pool_index(asset))
    }

    pub fn user_k(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        user: &Address,
    ) -> Result<U256, LedgerError> {
        slots.get(&keys::user_index(asset, user))
    }

    pub fn total_claimed(&self, slots: &StagedSlots<'_>, asset: &Asset) -> Result<U256, LedgerError> {
        slots.get(&keys::total_claimed(asset))
    }

    pub fn user_claimed(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        user: &Address,
    ) -> Result<U256, LedgerError> {
        slots.get(&keys::user_claimed(asset, user))
    }

    /// The user's fraction of the pool, WAD-scaled. Zero for an empty pool.
    pub fn user_share(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        user: &Address,
    ) -> Result<U256, LedgerError> {
        let total = self.total_staked(slots, asset)?;
        if total == U256::ZERO {
            return Ok(U256::ZERO);
        }
        let staked = self.user_staked(slots, asset, user)?;
        mul_div(staked, WAD, total, "user share")
    }

    /// What `claim_rewards` would pay right now, without writing anything.
    pub fn pending_rewards(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
        user: &Address,
    ) -> Result<U256, LedgerError> {
        let pool = self.pool(slots, asset)?;
        let (index, _) = self.projected_index(slots, asset, &pool)?;
        let position = self.position(slots, asset, user)?;
        owed(index, position.user_index, position.staked_amount)
    }

    /// Cheap accounting check:
    /// `total_claimed <= last_settled_income <= accumulated_income`.
    pub fn verify_consistency(
        &self,
        slots: &StagedSlots<'_>,
        asset: &Asset,
    ) -> Result<bool, LedgerError> {
        let pool = self.pool(slots, asset)?;
        let income = self.income.accumulated_income(slots, asset)?;
        let consistent =
            pool.total_claimed <= pool.last_settled_income && pool.last_settled_income <= income;
        if !consistent {
            tracing::warn!(
                %asset,
                total_claimed = %pool.total_claimed,
                last_settled = %pool.last_settled_income,
                income = %income,
                "Reward accounting inconsistent"
            );
        }
        Ok(consistent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::slot::{SlotKey, SlotStore};
    use tessera_store::MemoryStore;

    const CUSTODY: Address = Address::from_low_byte(0xee);
    const ALICE: Address = Address::from_low_byte(0xa1);
    const BOB: Address = Address::from_low_byte(0xb0);

    /// Income read straight from one test-controlled slot.
    struct FixedIncome;

    fn income_key(asset: &Asset) -> SlotKey {
        SlotKey::derive("test.income", &[asset.as_bytes()])
    }

    impl IncomeSource for FixedIncome {
        fn accumulated_income(
            &self,
            slots: &StagedSlots<'_>,
            asset: &Asset,
        ) -> Result<U256, LedgerError> {
            slots.get(&income_key(asset))
        }

        fn draw_income(&self, _: &mut Txn<'_>, _: &Asset, _: U256) -> Result<(), LedgerError> {
            Ok(())
        }
    }

    fn asset() -> Asset {
        Asset::from_low_byte(7)
    }

    fn ledger() -> RewardLedger<FixedIncome> {
        RewardLedger::new(FixedIncome)
    }

    fn run<R>(
        store: &mut MemoryStore,
        f: impl FnOnce(&mut Txn<'_>) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let (result, writes) = {
            let mut txn = Txn::begin(&*store);
            let result = f(&mut txn)?;
            (result, txn.into_parts().writes)
        };
        store.apply(&writes)?;
        Ok(result)
    }

    fn add_income(store: &mut MemoryStore, amount: u128) {
        let current = store.load(&income_key(&asset())).unwrap();
        store
            .store(income_key(&asset()), current + U256::new(amount))
            .unwrap();
    }

    #[test]
    fn test_index_scenario() {
        let mut store = MemoryStore::new();
        let ledger = ledger();

        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(200))).unwrap();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &BOB, &asset(), U256::new(800))).unwrap();
        add_income(&mut store, 100);

        let view = StagedSlots::begin(&store);
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &ALICE).unwrap(),
            U256::new(20)
        );

        let paid = run(&mut store, |t| ledger.claim_rewards(t, &CUSTODY, &ALICE, &asset())).unwrap();
        assert_eq!(paid, U256::new(20));

        let view = StagedSlots::begin(&store);
        assert_eq!(
            ledger.total_k(&view, &asset()).unwrap(),
            U256::new(100_000_000_000_000_000)
        );
        assert_eq!(ledger.last_mine_amount(&view, &asset()).unwrap(), U256::new(100));
        assert_eq!(ledger.user_claimed(&view, &asset(), &ALICE).unwrap(), U256::new(20));
        assert_eq!(ledger.total_claimed(&view, &asset()).unwrap(), U256::new(20));
    }

    #[test]
    fn test_no_double_payment() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        add_income(&mut store, 50);

        let first = run(&mut store, |t| ledger.claim_rewards(t, &CUSTODY, &ALICE, &asset())).unwrap();
        let second = run(&mut store, |t| ledger.claim_rewards(t, &CUSTODY, &ALICE, &asset())).unwrap();
        assert_eq!(first, U256::new(50));
        assert_eq!(second, U256::ZERO);
    }

    #[test]
    fn test_late_staker_gets_nothing_retroactive() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        add_income(&mut store, 100);

        // Bob's stake folds the income in first, so his index starts at K.
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &BOB, &asset(), U256::new(100))).unwrap();
        let view = StagedSlots::begin(&store);
        assert_eq!(ledger.pending_rewards(&view, &asset(), &BOB).unwrap(), U256::ZERO);
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &ALICE).unwrap(),
            U256::new(100)
        );
        assert_eq!(
            ledger.user_k(&view, &asset(), &BOB).unwrap(),
            ledger.total_k(&view, &asset()).unwrap()
        );
    }

    #[test]
    fn test_income_with_empty_pool_is_deferred() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        add_income(&mut store, 40);

        let index = run(&mut store, |t| ledger.refresh_pool_index(t, &asset())).unwrap();
        assert_eq!(index, U256::ZERO);
        let view = StagedSlots::begin(&store);
        assert_eq!(ledger.last_mine_amount(&view, &asset()).unwrap(), U256::ZERO);

        // First staker after the gap receives the deferred income.
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(10))).unwrap();
        let view = StagedSlots::begin(&store);
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &ALICE).unwrap(),
            U256::new(40)
        );
    }

    #[test]
    fn test_later_staker_earns_only_later_income() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        add_income(&mut store, 100);

        // Bob joins after the first 100 of income. K = 1.0 at this point.
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &BOB, &asset(), U256::new(300))).unwrap();
        let view = StagedSlots::begin(&store);
        assert_eq!(ledger.total_k(&view, &asset()).unwrap(), WAD);
        assert_eq!(ledger.user_k(&view, &asset(), &BOB).unwrap(), WAD);
        assert_eq!(ledger.pending_rewards(&view, &asset(), &BOB).unwrap(), U256::ZERO);
        drop(view);

        // The next 200 is split 100:300 across the pool of 400.
        add_income(&mut store, 200);
        let view = StagedSlots::begin(&store);
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &ALICE).unwrap(),
            U256::new(150)
        );
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &BOB).unwrap(),
            U256::new(150)
        );
        drop(view);

        let alice = run(&mut store, |t| ledger.claim_rewards(t, &CUSTODY, &ALICE, &asset())).unwrap();
        let bob = run(&mut store, |t| ledger.claim_rewards(t, &CUSTODY, &BOB, &asset())).unwrap();
        assert_eq!(alice, U256::new(150));
        assert_eq!(bob, U256::new(150));

        let view = StagedSlots::begin(&store);
        assert_eq!(ledger.total_claimed(&view, &asset()).unwrap(), U256::new(300));
        assert_eq!(
            ledger.total_k(&view, &asset()).unwrap(),
            U256::new(1_500_000_000_000_000_000)
        );
    }

    #[test]
    fn test_restake_does_not_reprice_old_income() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &BOB, &asset(), U256::new(100))).unwrap();
        add_income(&mut store, 100);

        // Bob triples his stake. The 50 he earned so far is paid out at the
        // old size, not the new one.
        let paid = run(&mut store, |t| ledger.stake(t, &CUSTODY, &BOB, &asset(), U256::new(200))).unwrap();
        assert_eq!(paid, U256::new(50));

        add_income(&mut store, 400);
        let view = StagedSlots::begin(&store);
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &ALICE).unwrap(),
            U256::new(150)
        );
        assert_eq!(
            ledger.pending_rewards(&view, &asset(), &BOB).unwrap(),
            U256::new(300)
        );
    }

    #[test]
    fn test_over_unstake_fails_without_writes() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        let before = store.len();

        let err = run(&mut store, |t| {
            ledger.unstake(t, &CUSTODY, &ALICE, &asset(), U256::new(150))
        })
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStake {
                requested: U256::new(150),
                available: U256::new(100),
            }
        );
        assert_eq!(store.len(), before);
        let view = StagedSlots::begin(&store);
        assert_eq!(ledger.user_staked(&view, &asset(), &ALICE).unwrap(), U256::new(100));
    }

    #[test]
    fn test_unstake_pays_and_returns_principal() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        add_income(&mut store, 30);

        let mut txn = Txn::begin(&store);
        let paid = ledger
            .unstake(&mut txn, &CUSTODY, &ALICE, &asset(), U256::new(100))
            .unwrap();
        assert_eq!(paid, U256::new(30));
        let names: Vec<_> = txn.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["RewardsClaimed", "Unstaked"]);
        assert_eq!(txn.transfers().len(), 2);
    }

    #[test]
    fn test_validation() {
        let store = MemoryStore::new();
        let ledger = ledger();
        let mut txn = Txn::begin(&store);
        assert_eq!(
            ledger.stake(&mut txn, &CUSTODY, &ALICE, &Asset::NULL, U256::ONE),
            Err(LedgerError::InvalidAsset { asset: Asset::NULL })
        );
        assert_eq!(
            ledger.stake(&mut txn, &CUSTODY, &ALICE, &asset(), U256::ZERO),
            Err(LedgerError::InvalidAmount { amount: U256::ZERO })
        );
        assert_eq!(
            ledger.unstake(&mut txn, &CUSTODY, &ALICE, &asset(), U256::ZERO),
            Err(LedgerError::InvalidAmount { amount: U256::ZERO })
        );
    }

    #[test]
    fn test_user_share() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        let view = StagedSlots::begin(&store);
        assert_eq!(ledger.user_share(&view, &asset(), &ALICE).unwrap(), U256::ZERO);
        drop(view);

        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(250))).unwrap();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &BOB, &asset(), U256::new(750))).unwrap();
        let view = StagedSlots::begin(&store);
        assert_eq!(
            ledger.user_share(&view, &asset(), &ALICE).unwrap(),
            U256::new(250_000_000_000_000_000)
        );
    }

    #[test]
    fn test_verify_consistency_bounds() {
        let mut store = MemoryStore::new();
        let ledger = ledger();
        run(&mut store, |t| ledger.stake(t, &CUSTODY, &ALICE, &asset(), U256::new(100))).unwrap();
        add_income(&mut store, 10);
        run(&mut store, |t| ledger.claim_rewards(t, &CUSTODY, &ALICE, &asset())).unwrap();

        let view = StagedSlots::begin(&store);
        assert!(ledger.verify_consistency(&view, &asset()).unwrap());
        drop(view);

        // Claimed more than was ever settled.
        store
            .store(keys::total_claimed(&asset()), U256::new(11))
            .unwrap();
        let view = StagedSlots::begin(&store);
        assert!(!ledger.verify_consistency(&view, &asset()).unwrap());
    }
}

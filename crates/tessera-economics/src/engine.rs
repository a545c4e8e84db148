// crates/tessera-economics/src/engine.rs
//
// LedgerEngine: the transactional front of the accounting core.
//
// Every mutating operation runs against a fresh `Txn` overlay and commits in
// a fixed order:
//   1. check transfer legs with the bank (no side effects)
//   2. check bridge exits (no side effects)
//   3. apply the slot batch to the store (atomic)
//   4. settle transfer legs
//   5. submit bridge exits
//   6. append events to the in-memory log
// A bank that lives in the slot store hands its writes back from
// `stage_settlement`; they join the batch in step 3 and step 4 is skipped.
// Stores with an event log persist the events in the same batch.
// A failure in steps 1-3 leaves no trace anywhere. The engine takes
// `&mut self` for writes, so operations are totally ordered by whoever owns it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use tessera_core::address::{Address, Asset};
use tessera_core::amount::U256;
use tessera_core::crypto::hash_bytes;
use tessera_core::error::LedgerError;
use tessera_core::events::LedgerEvent;
use tessera_core::operation::Operation;
use tessera_core::slot::SlotStore;
use tessera_core::traits::{AssetTransfer, Bridge};
use tessera_store::StagedSlots;

use crate::fee_reserve::{ChainRoute, FeePolicy, FeeReserveLedger, SwapOutcome};
use crate::keys;
use crate::rewards::{PoolSnapshot, RewardLedger, StakePosition};
use crate::txn::{Txn, TxnParts};

/// Identity and chain settings for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Sole address allowed to run admin operations. The zero address
    /// disables them entirely.
    #[serde(default)]
    pub admin: Address,
    /// Account that holds staked funds, reserves and fees.
    #[serde(default = "LedgerConfig::default_custody")]
    pub custody: Address,
    /// This ledger's chain id, used as the source of cross-chain swaps.
    #[serde(default = "LedgerConfig::default_chain_id")]
    pub chain_id: u64,
    /// Most recent events kept in memory for queries.
    #[serde(default = "LedgerConfig::default_event_log_capacity")]
    pub event_log_capacity: usize,
}

impl LedgerConfig {
    /// Deterministic custody address: the first 20 bytes of
    /// SHA-256("tessera.custody").
    pub fn default_custody() -> Address {
        let digest = hash_bytes(b"tessera.custody");
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Address(bytes)
    }

    pub fn default_chain_id() -> u64 {
        1
    }

    pub fn default_event_log_capacity() -> usize {
        10_000
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin: Address::ZERO,
            custody: Self::default_custody(),
            chain_id: Self::default_chain_id(),
            event_log_capacity: Self::default_event_log_capacity(),
        }
    }
}

/// Borrowed view of the ledgers handed to each operation body.
struct Ledgers<'e> {
    fees: &'e FeeReserveLedger,
    rewards: &'e RewardLedger<FeeReserveLedger>,
    config: &'e LedgerConfig,
}

/// The ledger engine.
pub struct LedgerEngine {
    config: LedgerConfig,
    store: Box<dyn SlotStore>,
    bank: Box<dyn AssetTransfer>,
    bridge: Option<Box<dyn Bridge>>,
    fees: FeeReserveLedger,
    rewards: RewardLedger<FeeReserveLedger>,
    events: VecDeque<LedgerEvent>,
}

impl LedgerEngine {
    /// Build an engine over `store` and `bank`. The event log is seeded
    /// with the newest events the store has persisted.
    pub fn new(
        config: LedgerConfig,
        store: Box<dyn SlotStore>,
        bank: Box<dyn AssetTransfer>,
    ) -> Self {
        let events = match store.recent_events(config.event_log_capacity) {
            Ok(events) => VecDeque::from(events),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted events; starting with an empty log");
                VecDeque::new()
            }
        };
        if !events.is_empty() {
            tracing::info!("Loaded {} persisted events", events.len());
        }
        let fees = FeeReserveLedger::new();
        Self {
            config,
            store,
            bank,
            bridge: None,
            fees,
            rewards: RewardLedger::new(fees),
            events,
        }
    }

    /// Install a bridge at construction time, bypassing the admin gate.
    pub fn with_bridge(mut self, bridge: Box<dyn Bridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn bank(&self) -> &dyn AssetTransfer {
        self.bank.as_ref()
    }

    /// Direct access to the bank, for approvals and other calls that do not
    /// go through the ledger.
    pub fn bank_mut(&mut self) -> &mut dyn AssetTransfer {
        self.bank.as_mut()
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    // -----------------------------------------------------------------------
    // Transaction plumbing
    // -----------------------------------------------------------------------

    fn require_admin(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.config.admin.is_zero() || *caller != self.config.admin {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Run `body` against a staged transaction and commit it on success.
    fn execute<R>(
        &mut self,
        op: Operation,
        body: impl FnOnce(&mut Txn<'_>, &Ledgers<'_>) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let staged = {
            let ledgers = Ledgers {
                fees: &self.fees,
                rewards: &self.rewards,
                config: &self.config,
            };
            let mut txn = Txn::begin(self.store.as_ref());
            body(&mut txn, &ledgers).map(|result| (result, txn.into_parts()))
        };

        match staged {
            Ok((result, parts)) => {
                self.commit(op, parts)?;
                Ok(result)
            }
            Err(e) => {
                tracing::debug!(op = op.name(), error = %e, "Operation rejected");
                Err(e)
            }
        }
    }

    fn commit(&mut self, op: Operation, parts: TxnParts) -> Result<(), LedgerError> {
        if let Err(e) = self.bank.check_batch(&parts.transfers) {
            tracing::debug!(op = op.name(), error = %e, "Transfer check failed");
            return Err(e);
        }

        if !parts.exits.is_empty() {
            let bridge = self
                .bridge
                .as_deref()
                .ok_or(LedgerError::BridgeNotConfigured)?;
            for exit in &parts.exits {
                if let Err(e) = bridge.check_exit(exit) {
                    tracing::debug!(op = op.name(), error = %e, "Bridge check failed");
                    return Err(e);
                }
            }
        }

        let settlement = if parts.transfers.is_empty() {
            None
        } else {
            self.bank.stage_settlement(&parts.transfers)?
        };
        let mut writes = parts.writes;
        let ledger_writes = writes.len();
        if let Some(bank_writes) = &settlement {
            writes.extend_from_slice(bank_writes);
        }
        self.store.apply_with_events(&writes, &parts.events)?;

        // Both collaborators accepted the batch above; a failure from here on
        // leaves the store ahead of the bank or bridge.
        if settlement.is_none() {
            if let Err(e) = self.bank.settle(&parts.transfers) {
                tracing::error!(op = op.name(), error = %e, "Settlement failed after store commit");
                return Err(e);
            }
        }
        if let Some(bridge) = self.bridge.as_deref_mut() {
            for exit in parts.exits {
                if let Err(e) = bridge.exit(exit) {
                    tracing::error!(op = op.name(), error = %e, "Bridge exit failed after store commit");
                    return Err(e);
                }
            }
        }

        tracing::info!(
            op = op.name(),
            writes = ledger_writes,
            transfers = parts.transfers.len(),
            events = parts.events.len(),
            "Operation committed"
        );
        self.record_events(parts.events);
        Ok(())
    }

    fn record_events(&mut self, events: Vec<LedgerEvent>) {
        self.events.extend(events);
        let capacity = self.config.event_log_capacity;
        if self.events.len() > capacity {
            let excess = self.events.len() - capacity;
            self.events.drain(..excess);
        }
    }

    /// Run a read-only query against the committed state.
    fn view<R>(
        &self,
        query: impl FnOnce(&StagedSlots<'_>, &Ledgers<'_>) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let slots = StagedSlots::begin(self.store.as_ref());
        let ledgers = Ledgers {
            fees: &self.fees,
            rewards: &self.rewards,
            config: &self.config,
        };
        query(&slots, &ledgers)
    }

    // -----------------------------------------------------------------------
    // Request nonces
    // -----------------------------------------------------------------------

    /// Highest nonce accepted from `caller`, zero if none.
    pub fn last_nonce(&self, caller: Address) -> Result<U256, LedgerError> {
        self.store.load(&keys::nonce(&caller))
    }

    /// Record `nonce` as used by `caller`. Nonces must strictly increase.
    ///
    /// # Errors
    /// `StaleNonce` if `nonce` is not above the last accepted one.
    pub fn use_nonce(&mut self, caller: Address, nonce: u64) -> Result<(), LedgerError> {
        let key = keys::nonce(&caller);
        let last = self.store.load(&key)?;
        let requested = U256::from(nonce);
        if requested <= last {
            return Err(LedgerError::StaleNonce { caller, nonce, last });
        }
        self.store.store(key, requested)
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    /// Set the fee policy for both directions of a pair.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is the admin; `InvalidAsset` or
    /// `FeeTooHigh` on bad arguments.
    pub fn set_fee_policy(
        &mut self,
        caller: Address,
        asset_a: Asset,
        asset_b: Asset,
        in_fee: U256,
        out_fee: U256,
    ) -> Result<(), LedgerError> {
        self.require_admin(&caller)?;
        self.execute(Operation::SetFeePolicy, |txn, l| {
            l.fees.set_fee_policy(txn, &asset_a, &asset_b, in_fee, out_fee)
        })
    }

    /// Pull `amount` of `asset` from the admin into the reserve.
    pub fn fund_reserve(
        &mut self,
        caller: Address,
        asset: Asset,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.require_admin(&caller)?;
        self.execute(Operation::FundReserve, |txn, l| {
            l.fees
                .fund_reserve(txn, &l.config.custody, &caller, &asset, amount)
        })
    }

    /// Pay `amount` of `asset` out of the reserve to `to`.
    pub fn withdraw_reserve(
        &mut self,
        caller: Address,
        asset: Asset,
        amount: U256,
        to: Address,
    ) -> Result<(), LedgerError> {
        self.require_admin(&caller)?;
        self.execute(Operation::WithdrawReserve, |txn, l| {
            l.fees
                .withdraw_reserve(txn, &l.config.custody, &asset, amount, &to)
        })
    }

    /// Replace the registered bridge.
    pub fn register_bridge(
        &mut self,
        caller: Address,
        bridge: Box<dyn Bridge>,
    ) -> Result<(), LedgerError> {
        self.require_admin(&caller)?;
        self.bridge = Some(bridge);
        tracing::info!(admin = %caller, "Bridge registered");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Swaps
    // -----------------------------------------------------------------------

    pub fn swap(
        &mut self,
        caller: Address,
        asset_in: Asset,
        asset_out: Asset,
        amount_in: U256,
        recipient: Address,
    ) -> Result<SwapOutcome, LedgerError> {
        self.execute(Operation::Swap, |txn, l| {
            l.fees.swap(
                txn,
                &l.config.custody,
                &caller,
                &asset_in,
                &asset_out,
                amount_in,
                &recipient,
            )
        })
    }

    /// Swap with the output released on `dest_chain` through the bridge.
    ///
    /// # Errors
    /// `BridgeNotConfigured` if no bridge is registered; `InvalidChain` if
    /// the bridge rejects the route.
    pub fn cross_chain_swap(
        &mut self,
        caller: Address,
        asset_in: Asset,
        asset_out: Asset,
        amount_in: U256,
        recipient: Address,
        dest_chain: u64,
    ) -> Result<SwapOutcome, LedgerError> {
        if self.bridge.is_none() {
            return Err(LedgerError::BridgeNotConfigured);
        }
        self.execute(Operation::CrossChainSwap, |txn, l| {
            let route = ChainRoute {
                source_chain: l.config.chain_id,
                dest_chain,
            };
            l.fees.cross_chain_swap(
                txn,
                &l.config.custody,
                &caller,
                &asset_in,
                &asset_out,
                amount_in,
                &recipient,
                route,
            )
        })
    }

    pub fn accumulated_fees(&self, asset_a: Asset, asset_b: Asset) -> Result<(U256, U256), LedgerError> {
        self.view(|slots, l| l.fees.accumulated_fees(slots, &asset_a, &asset_b))
    }

    pub fn accumulated_fee(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.fees.accumulated_fee(slots, &asset))
    }

    pub fn reserve_of(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.fees.reserve(slots, &asset))
    }

    pub fn fee_policy(&self, from: Asset, to: Asset) -> Result<FeePolicy, LedgerError> {
        self.view(|slots, l| l.fees.fee_policy(slots, &from, &to))
    }

    // -----------------------------------------------------------------------
    // Staking
    // -----------------------------------------------------------------------

    /// Stake `amount` of `asset`. Returns any reward paid on the way.
    pub fn stake(&mut self, caller: Address, asset: Asset, amount: U256) -> Result<U256, LedgerError> {
        self.execute(Operation::Stake, |txn, l| {
            l.rewards
                .stake(txn, &l.config.custody, &caller, &asset, amount)
        })
    }

    /// Unstake `amount` of `asset`. Returns any reward paid on the way.
    pub fn unstake(&mut self, caller: Address, asset: Asset, amount: U256) -> Result<U256, LedgerError> {
        self.execute(Operation::Unstake, |txn, l| {
            l.rewards
                .unstake(txn, &l.config.custody, &caller, &asset, amount)
        })
    }

    /// Claim pending rewards. Returns the amount paid, possibly zero.
    pub fn claim_rewards(&mut self, caller: Address, asset: Asset) -> Result<U256, LedgerError> {
        self.execute(Operation::ClaimRewards, |txn, l| {
            l.rewards
                .claim_rewards(txn, &l.config.custody, &caller, &asset)
        })
    }

    pub fn pool(&self, asset: Asset) -> Result<PoolSnapshot, LedgerError> {
        self.view(|slots, l| l.rewards.pool(slots, &asset))
    }

    pub fn position(&self, asset: Asset, user: Address) -> Result<StakePosition, LedgerError> {
        self.view(|slots, l| l.rewards.position(slots, &asset, &user))
    }

    pub fn total_staked(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.total_staked(slots, &asset))
    }

    pub fn user_staked(&self, asset: Asset, user: Address) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.user_staked(slots, &asset, &user))
    }

    pub fn last_mine_amount(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.last_mine_amount(slots, &asset))
    }

    pub fn total_k(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.total_k(slots, &asset))
    }

    pub fn user_k(&self, asset: Asset, user: Address) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.user_k(slots, &asset, &user))
    }

    pub fn total_claimed(&self, asset: Asset) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.total_claimed(slots, &asset))
    }

    pub fn user_claimed(&self, asset: Asset, user: Address) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.user_claimed(slots, &asset, &user))
    }

    pub fn user_share(&self, asset: Asset, user: Address) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.user_share(slots, &asset, &user))
    }

    pub fn pending_rewards(&self, asset: Asset, user: Address) -> Result<U256, LedgerError> {
        self.view(|slots, l| l.rewards.pending_rewards(slots, &asset, &user))
    }

    pub fn verify_consistency(&self, asset: Asset) -> Result<bool, LedgerError> {
        self.view(|slots, l| l.rewards.verify_consistency(slots, &asset))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// The most recent committed events, oldest first, up to
    /// `event_log_capacity` of them.
    pub fn events(&self) -> &VecDeque<LedgerEvent> {
        &self.events
    }

    /// Events matching both filters. `None` matches everything.
    pub fn events_for(&self, asset: Option<&Asset>, user: Option<&Address>) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|e| asset.map_or(true, |a| e.involves_asset(a)))
            .filter(|e| user.map_or(true, |u| e.involves_user(u)))
            .collect()
    }
}

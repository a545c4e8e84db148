// crates/tessera-economics/src/keys.rs
//
// Slot namespaces for both ledgers.
//
// Each field of each record gets its own namespace, so the reward ledger
// and the fee/reserve ledger never share a counter even though they live in
// the same store.

use tessera_core::address::{Address, Asset};
use tessera_core::slot::SlotKey;

// Reward ledger, per asset
const TOTAL_STAKED: &str = "stake.total";
const POOL_INDEX: &str = "pool.index";
const LAST_SETTLED_INCOME: &str = "pool.last_settled_income";
const TOTAL_CLAIMED: &str = "pool.total_claimed";

// Reward ledger, per (asset, user)
const USER_STAKED: &str = "stake.user";
const USER_INDEX: &str = "pool.user_index";
const USER_CLAIMED: &str = "pool.user_claimed";

// Fee/reserve ledger
const RESERVE: &str = "swap.reserve";
const ACCUMULATED_FEE: &str = "swap.accumulated_fee";
const IN_FEE_RATE: &str = "swap.fee.in";
const OUT_FEE_RATE: &str = "swap.fee.out";

// Request authentication, per caller
const NONCE: &str = "auth.nonce";

fn per_asset(namespace: &str, asset: &Asset) -> SlotKey {
    SlotKey::derive(namespace, &[asset.as_bytes()])
}

fn per_user(namespace: &str, asset: &Asset, user: &Address) -> SlotKey {
    SlotKey::derive(namespace, &[asset.as_bytes(), user.as_bytes()])
}

fn per_pair(namespace: &str, from: &Asset, to: &Asset) -> SlotKey {
    SlotKey::derive(namespace, &[from.as_bytes(), to.as_bytes()])
}

pub fn total_staked(asset: &Asset) -> SlotKey {
    per_asset(TOTAL_STAKED, asset)
}

pub fn pool_index(asset: &Asset) -> SlotKey {
    per_asset(POOL_INDEX, asset)
}

pub fn last_settled_income(asset: &Asset) -> SlotKey {
    per_asset(LAST_SETTLED_INCOME, asset)
}

pub fn total_claimed(asset: &Asset) -> SlotKey {
    per_asset(TOTAL_CLAIMED, asset)
}

pub fn user_staked(asset: &Asset, user: &Address) -> SlotKey {
    per_user(USER_STAKED, asset, user)
}

pub fn user_index(asset: &Asset, user: &Address) -> SlotKey {
    per_user(USER_INDEX, asset, user)
}

pub fn user_claimed(asset: &Asset, user: &Address) -> SlotKey {
    per_user(USER_CLAIMED, asset, user)
}

pub fn reserve(asset: &Asset) -> SlotKey {
    per_asset(RESERVE, asset)
}

pub fn accumulated_fee(asset: &Asset) -> SlotKey {
    per_asset(ACCUMULATED_FEE, asset)
}

/// Fee charged on entry for the ordered pair (from -> to).
pub fn in_fee_rate(from: &Asset, to: &Asset) -> SlotKey {
    per_pair(IN_FEE_RATE, from, to)
}

/// Fee charged on exit for the ordered pair (from -> to).
pub fn out_fee_rate(from: &Asset, to: &Asset) -> SlotKey {
    per_pair(OUT_FEE_RATE, from, to)
}

/// Highest request nonce accepted from `caller`.
pub fn nonce(caller: &Address) -> SlotKey {
    SlotKey::derive(NONCE, &[caller.as_bytes()])
}

// crates/tessera-economics/src/lib.rs
//
// tessera-economics: cumulative-index staking rewards, swap reserves and
// fees, and the transactional engine that commits them.
//
// All amounts are U256 base units; rates and indices are WAD-scaled (1e18).

pub mod bridge;
pub mod engine;
pub mod fee_reserve;
pub mod keys;
pub mod rewards;
pub mod txn;

// Re-export key types for ergonomic access from downstream crates.
pub use bridge::{ExitOutbox, ExitQueue};
pub use engine::{LedgerConfig, LedgerEngine};
pub use fee_reserve::{ChainRoute, FeePolicy, FeeReserveLedger, SwapOutcome};
pub use rewards::{IncomeSource, PoolSnapshot, RewardLedger, StakePosition};
pub use txn::{Txn, TxnParts};

// crates/tessera-store/src/lib.rs
//
// tessera-store: Storage layer for the Tessera ledger.
//
// Provides the two `SlotStore` backends (a HashMap-backed store for tests
// and ephemeral nodes, and a RocksDB-backed store for durable nodes), the
// `StagedSlots` write overlay that gives every ledger operation
// all-or-nothing semantics, and two implementations of the external
// asset-transfer capability: `InMemoryBank` and `RocksBank`, which keeps
// balances in the same RocksDB as the ledger slots.

pub mod bank;
pub mod memory;
pub mod rocks;
pub mod rocks_bank;
pub mod staged;

// Re-export key types for ergonomic access from downstream crates.
pub use bank::{GenesisGrant, InMemoryBank};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use rocks_bank::RocksBank;
pub use staged::StagedSlots;

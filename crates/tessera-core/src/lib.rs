// crates/tessera-core/src/lib.rs
//
// tessera-core: Core types, errors, events, and collaborator traits for the
// Tessera ledger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines identifiers, the 256-bit amount type with its fixed-point
// helpers, the ledger error taxonomy, the event records, the stable
// operation selector table, the slot store trait, and the traits for the
// external asset-transfer and bridge collaborators.

pub mod address;
pub mod amount;
pub mod crypto;
pub mod error;
pub mod events;
pub mod operation;
pub mod slot;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use tessera_core::{Asset, LedgerError};`

pub use address::{Address, Asset};
pub use amount::{U256, WAD};
pub use error::LedgerError;
pub use events::LedgerEvent;
pub use operation::Operation;
pub use slot::{SlotKey, SlotStore};
pub use traits::{AssetTransfer, Bridge, ExitRequest, TransferLeg};

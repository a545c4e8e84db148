// crates/tessera-economics/src/txn.rs
//
// One in-flight ledger operation.
//
// Collects staged slot writes, transfer legs, bridge exits, and events.
// Nothing reaches the store, the bank, or the bridge until the engine
// commits the parts; dropping a Txn is a full rollback.

use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::events::LedgerEvent;
use tessera_core::slot::{SlotKey, SlotStore};
use tessera_core::traits::{ExitRequest, TransferLeg};
use tessera_store::StagedSlots;

/// A staged operation.
pub struct Txn<'a> {
    slots: StagedSlots<'a>,
    transfers: Vec<TransferLeg>,
    exits: Vec<ExitRequest>,
    events: Vec<LedgerEvent>,
}

/// Everything a successful operation wants to commit.
#[derive(Debug, Default)]
pub struct TxnParts {
    pub writes: Vec<(SlotKey, U256)>,
    pub transfers: Vec<TransferLeg>,
    pub exits: Vec<ExitRequest>,
    pub events: Vec<LedgerEvent>,
}

impl<'a> Txn<'a> {
    pub fn begin(base: &'a dyn SlotStore) -> Self {
        Self {
            slots: StagedSlots::begin(base),
            transfers: Vec::new(),
            exits: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Read-only view of the staged state.
    pub fn slots(&self) -> &StagedSlots<'a> {
        &self.slots
    }

    pub fn get(&self, key: &SlotKey) -> Result<U256, LedgerError> {
        self.slots.get(key)
    }

    pub fn set(&mut self, key: SlotKey, value: U256) {
        self.slots.set(key, value);
    }

    /// Queue a transfer leg. Zero-amount legs are dropped.
    pub fn push_transfer(&mut self, leg: TransferLeg) {
        if leg.amount() != U256::ZERO {
            self.transfers.push(leg);
        }
    }

    pub fn push_exit(&mut self, exit: ExitRequest) {
        self.exits.push(exit);
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn transfers(&self) -> &[TransferLeg] {
        &self.transfers
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn into_parts(self) -> TxnParts {
        TxnParts {
            writes: self.slots.into_writes(),
            transfers: self.transfers,
            exits: self.exits,
            events: self.events,
        }
    }
}

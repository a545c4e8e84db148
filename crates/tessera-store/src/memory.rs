// crates/tessera-store/src/memory.rs
//
// HashMap-backed slot store. Nothing survives a restart.

use std::collections::HashMap;

use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::slot::{SlotKey, SlotStore};

/// In-memory `SlotStore`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<SlotKey, U256>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots ever written (including ones written back to zero).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, key: &SlotKey) -> Result<U256, LedgerError> {
        Ok(self.slots.get(key).copied().unwrap_or(U256::ZERO))
    }

    fn apply(&mut self, writes: &[(SlotKey, U256)]) -> Result<(), LedgerError> {
        for (key, value) in writes {
            self.slots.insert(*key, *value);
        }
        Ok(())
    }
}

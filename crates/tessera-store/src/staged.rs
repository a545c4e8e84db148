// crates/tessera-store/src/staged.rs
//
// StagedSlots: a write overlay over a borrowed SlotStore.
//
// Reads see the overlay first, then the base store. Writes only touch the
// overlay. `into_writes` hands the batch to the caller for an atomic
// `SlotStore::apply`; dropping the overlay instead discards every write,
// which is how a failed operation rolls back.

use std::collections::BTreeMap;

use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::slot::{SlotKey, SlotStore};

/// Uncommitted slot writes layered on top of a base store.
pub struct StagedSlots<'a> {
    base: &'a dyn SlotStore,
    writes: BTreeMap<SlotKey, U256>,
}

impl<'a> StagedSlots<'a> {
    /// Start an empty overlay over `base`.
    pub fn begin(base: &'a dyn SlotStore) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Read a slot as the operation currently sees it.
    pub fn get(&self, key: &SlotKey) -> Result<U256, LedgerError> {
        match self.writes.get(key) {
            Some(value) => Ok(*value),
            None => self.base.load(key),
        }
    }

    /// Stage a write.
    pub fn set(&mut self, key: SlotKey, value: U256) {
        self.writes.insert(key, value);
    }

    /// Number of distinct slots written so far.
    pub fn dirty_len(&self) -> usize {
        self.writes.len()
    }

    /// Consume the overlay and return the batch, in key order.
    pub fn into_writes(self) -> Vec<(SlotKey, U256)> {
        self.writes.into_iter().collect()
    }
}

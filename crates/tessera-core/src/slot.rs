// crates/tessera-core/src/slot.rs
//
// Storage slot keys and the slot store trait.
//
// A slot is one 256-bit integer addressed by a deterministic hash of a
// namespace tag plus one or more identifiers. Reads of never-written slots
// return zero; "absent" and "present with zero" are not distinguished.

use std::fmt;

use crate::amount::U256;
use crate::crypto::hash_parts;
use crate::error::LedgerError;
use crate::events::LedgerEvent;

/// A 32-byte content-derived slot address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey([u8; 32]);

impl SlotKey {
    /// Derive the key for `namespace` and identifier `parts`.
    ///
    /// Stable for the lifetime of the store: the same inputs always map to
    /// the same key.
    pub fn derive(namespace: &str, parts: &[&[u8]]) -> Self {
        let mut all: Vec<&[u8]> = Vec::with_capacity(parts.len() + 1);
        all.push(namespace.as_bytes());
        all.extend_from_slice(parts);
        SlotKey(hash_parts(&all))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SlotKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotKey({})", hex::encode(&self.0[..8]))
    }
}

/// Trait for persistent slot storage.
///
/// Implemented by tessera-store (in-memory and RocksDB backends). No
/// validation happens here; callers enforce invariants.
pub trait SlotStore: Send + Sync {
    /// Read a slot. Returns zero if it was never written.
    fn load(&self, key: &SlotKey) -> Result<U256, LedgerError>;

    /// Write a batch of slots. Either every write lands or none does.
    fn apply(&mut self, writes: &[(SlotKey, U256)]) -> Result<(), LedgerError>;

    /// Write a single slot.
    fn store(&mut self, key: SlotKey, value: U256) -> Result<(), LedgerError> {
        self.apply(&[(key, value)])
    }

    /// Write a batch of slots and append `events` to the event log in the
    /// same atomic unit. Stores without an event log only apply the writes.
    fn apply_with_events(
        &mut self,
        writes: &[(SlotKey, U256)],
        events: &[LedgerEvent],
    ) -> Result<(), LedgerError> {
        let _ = events;
        self.apply(writes)
    }

    /// The last `limit` persisted events, oldest first.
    fn recent_events(&self, limit: usize) -> Result<Vec<LedgerEvent>, LedgerError> {
        let _ = limit;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = SlotKey::derive("stake.total", &[b"asset-1"]);
        let b = SlotKey::derive("stake.total", &[b"asset-1"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_separates_namespaces_and_ids() {
        let base = SlotKey::derive("stake.total", &[b"asset-1"]);
        assert_ne!(base, SlotKey::derive("reserve", &[b"asset-1"]));
        assert_ne!(base, SlotKey::derive("stake.total", &[b"asset-2"]));
        assert_ne!(
            SlotKey::derive("stake.user", &[b"a", b"bc"]),
            SlotKey::derive("stake.user", &[b"ab", b"c"])
        );
    }
}

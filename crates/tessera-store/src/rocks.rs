// crates/tessera-store/src/rocks.rs
//
// RocksDB-backed persistent slot storage and event log.
//
// Key format:
//   - `slot:` followed by the raw 32-byte SlotKey -> 32-byte big-endian U256
//   - `event:` followed by an 8-byte big-endian sequence -> JSON LedgerEvent
//
// Batches go through a single RocksDB WriteBatch, so a ledger operation's
// writes and events land together or not at all.

use std::sync::Arc;

use rocksdb::{DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options, WriteBatch};

use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::events::LedgerEvent;
use tessera_core::slot::{SlotKey, SlotStore};

use crate::rocks_bank::RocksBank;

pub(crate) type Db = DBWithThreadMode<MultiThreaded>;

const SLOT_PREFIX: &[u8] = b"slot:";
const EVENT_PREFIX: &[u8] = b"event:";

/// RocksDB wrapper implementing the `SlotStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: Arc<Db>,
    next_event: u64,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = Db::open(&opts, path).map_err(|e| {
            LedgerError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;
        let db = Arc::new(db);

        let next_event = match last_event_seq(&db)? {
            Some(seq) => seq + 1,
            None => 0,
        };

        tracing::debug!("Opened slot store at {} ({} events logged)", path, next_event);
        Ok(Self { db, next_event })
    }

    /// A bank keeping balances in this database.
    pub fn bank(&self) -> RocksBank {
        RocksBank::new(Arc::clone(&self.db))
    }

    /// Number of events ever appended.
    pub fn event_count(&self) -> u64 {
        self.next_event
    }
}

/// Build the on-disk key for a slot: `slot:{32 bytes}`.
pub(crate) fn slot_key(key: &SlotKey) -> Vec<u8> {
    let mut raw = Vec::with_capacity(SLOT_PREFIX.len() + 32);
    raw.extend_from_slice(SLOT_PREFIX);
    raw.extend_from_slice(key.as_bytes());
    raw
}

/// Build the on-disk key for an event: `event:{8 bytes BE}`.
fn event_key(seq: u64) -> Vec<u8> {
    let mut raw = Vec::with_capacity(EVENT_PREFIX.len() + 8);
    raw.extend_from_slice(EVENT_PREFIX);
    raw.extend_from_slice(&seq.to_be_bytes());
    raw
}

/// Read one slot, mapping errors to LedgerError::Storage.
pub(crate) fn read_slot(db: &Db, key: &SlotKey) -> Result<U256, LedgerError> {
    let raw = db
        .get(slot_key(key))
        .map_err(|e| LedgerError::Storage(format!("RocksDB get failed: {}", e)))?;
    match raw {
        Some(bytes) => decode_value(&bytes),
        None => Ok(U256::ZERO),
    }
}

/// Write slots in one batch.
pub(crate) fn write_slots(db: &Db, writes: &[(SlotKey, U256)]) -> Result<(), LedgerError> {
    let mut batch = WriteBatch::default();
    put_slots(&mut batch, writes);
    commit_batch(db, batch)
}

fn put_slots(batch: &mut WriteBatch, writes: &[(SlotKey, U256)]) {
    for (key, value) in writes {
        batch.put(slot_key(key), value.to_be_bytes());
    }
}

fn commit_batch(db: &Db, batch: WriteBatch) -> Result<(), LedgerError> {
    db.write(batch)
        .map_err(|e| LedgerError::Storage(format!("RocksDB batch write failed: {}", e)))
}

/// Decode a stored slot value. Anything but 32 bytes is corruption.
fn decode_value(bytes: &[u8]) -> Result<U256, LedgerError> {
    let array: [u8; 32] = bytes.try_into().map_err(|_| {
        LedgerError::Storage(format!(
            "Corrupt slot value: expected 32 bytes, found {}",
            bytes.len()
        ))
    })?;
    Ok(U256::from_be_bytes(array))
}

/// Iterate `event:` entries from the newest backwards.
fn events_newest_first(
    db: &Db,
) -> impl Iterator<Item = Result<(u64, Box<[u8]>), LedgerError>> + '_ {
    let upper = event_key(u64::MAX);
    db.iterator(IteratorMode::From(&upper, Direction::Reverse))
        .map(|item| item.map_err(|e| LedgerError::Storage(format!("RocksDB scan failed: {}", e))))
        .take_while(|item| match item {
            Ok((key, _)) => key.starts_with(EVENT_PREFIX),
            Err(_) => true,
        })
        .map(|item| {
            let (key, value) = item?;
            let seq: [u8; 8] = key[EVENT_PREFIX.len()..].try_into().map_err(|_| {
                LedgerError::Storage("Corrupt event key: expected 8-byte sequence".to_string())
            })?;
            Ok((u64::from_be_bytes(seq), value))
        })
}

fn last_event_seq(db: &Db) -> Result<Option<u64>, LedgerError> {
    match events_newest_first(db).next() {
        Some(item) => Ok(Some(item?.0)),
        None => Ok(None),
    }
}

impl SlotStore for RocksStore {
    fn load(&self, key: &SlotKey) -> Result<U256, LedgerError> {
        read_slot(&self.db, key)
    }

    fn apply(&mut self, writes: &[(SlotKey, U256)]) -> Result<(), LedgerError> {
        write_slots(&self.db, writes)
    }

    fn apply_with_events(
        &mut self,
        writes: &[(SlotKey, U256)],
        events: &[LedgerEvent],
    ) -> Result<(), LedgerError> {
        let mut batch = WriteBatch::default();
        put_slots(&mut batch, writes);
        let mut seq = self.next_event;
        for event in events {
            batch.put(event_key(seq), serde_json::to_vec(event)?);
            seq += 1;
        }
        commit_batch(&self.db, batch)?;
        self.next_event = seq;
        Ok(())
    }

    fn recent_events(&self, limit: usize) -> Result<Vec<LedgerEvent>, LedgerError> {
        let mut events = Vec::with_capacity(limit.min(1024));
        for item in events_newest_first(&self.db).take(limit) {
            let (_, value) = item?;
            events.push(serde_json::from_slice(&value)?);
        }
        events.reverse();
        Ok(events)
    }
}

// crates/tessera-daemon/src/node.rs
//
// Assembles a LedgerEngine from DaemonConfig: slot store and bank
// selection, genesis balances, and the optional exit bridge.
//
// With the RocksDB backend the bank lives in the same database as the
// ledger slots, so balances survive restarts together with stakes and
// reserves.

use tessera_core::error::LedgerError;
use tessera_core::slot::SlotStore;
use tessera_core::traits::AssetTransfer;
use tessera_economics::{ExitOutbox, ExitQueue, LedgerEngine};
use tessera_store::{GenesisGrant, InMemoryBank, MemoryStore, RocksStore};

use crate::config::{DaemonConfig, StoreBackend};

/// A constructed engine plus the drain side of its bridge, if any.
pub struct LedgerNode {
    pub engine: LedgerEngine,
    pub outbox: Option<ExitOutbox>,
}

/// Genesis allocations as bank grants, approving custody where asked.
pub fn genesis_grants(config: &DaemonConfig) -> Vec<GenesisGrant> {
    let custody = config.ledger.custody;
    config
        .genesis
        .iter()
        .map(|alloc| GenesisGrant {
            asset: alloc.asset,
            holder: alloc.holder,
            amount: alloc.amount,
            approve: alloc.approve_custody.then_some(custody),
        })
        .collect()
}

/// Build an in-memory bank from the genesis allocations.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if allocations for one holder overflow.
pub fn genesis_bank(config: &DaemonConfig) -> Result<InMemoryBank, LedgerError> {
    InMemoryBank::from_genesis(&genesis_grants(config))
}

/// Open the configured slot store and the bank that goes with it.
/// RocksDB lives at `{data_dir}/ledger_rocksdb`.
pub fn open_ledger(
    config: &DaemonConfig,
    data_dir: &str,
) -> Result<(Box<dyn SlotStore>, Box<dyn AssetTransfer>), LedgerError> {
    match config.store {
        StoreBackend::RocksDb => {
            let path = format!("{}/ledger_rocksdb", data_dir);
            let store = RocksStore::open(&path)?;
            let mut bank = store.bank();
            bank.apply_genesis(&genesis_grants(config))?;
            tracing::info!("Slot store and bank opened at {}", path);
            Ok((Box::new(store), Box::new(bank)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory slot store and bank; ledger state is lost on exit");
            Ok((Box::new(MemoryStore::new()), Box::new(genesis_bank(config)?)))
        }
    }
}

/// Build the engine described by `config`.
pub fn build(config: &DaemonConfig, data_dir: &str) -> Result<LedgerNode, LedgerError> {
    let (store, bank) = open_ledger(config, data_dir)?;
    let mut engine = LedgerEngine::new(config.ledger.clone(), store, bank);

    let outbox = if config.bridge.enabled {
        let bridge = ExitQueue::new(
            config.ledger.chain_id,
            config.bridge.supported_chains.iter().copied(),
        );
        let outbox = bridge.outbox();
        engine = engine.with_bridge(Box::new(bridge));
        tracing::info!(
            "Bridge enabled for chains {:?}",
            config.bridge.supported_chains
        );
        Some(outbox)
    } else {
        None
    };

    if config.ledger.admin.is_zero() {
        tracing::warn!("No admin configured; admin operations are disabled");
    }

    Ok(LedgerNode { engine, outbox })
}

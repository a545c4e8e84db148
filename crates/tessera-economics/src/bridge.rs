// crates/tessera-economics/src/bridge.rs
//
// ExitQueue: reference cross-chain bridge.
//
// Validates chain identifiers and queues accepted exit requests in a shared
// outbox. A relayer (the daemon's drain loop, or a test) takes them out of
// the outbox through an `ExitOutbox` handle.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use tessera_core::amount::U256;
use tessera_core::error::LedgerError;
use tessera_core::traits::{Bridge, ExitRequest};

type Queue = Arc<Mutex<VecDeque<ExitRequest>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<ExitRequest>> {
    // A panic while holding the lock cannot leave a half-pushed request.
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Bridge that accepts exits for a fixed set of destination chains.
#[derive(Debug)]
pub struct ExitQueue {
    local_chain: u64,
    supported: BTreeSet<u64>,
    queue: Queue,
}

/// Read side of an `ExitQueue`.
#[derive(Debug, Clone)]
pub struct ExitOutbox {
    queue: Queue,
}

impl ExitQueue {
    pub fn new(local_chain: u64, supported: impl IntoIterator<Item = u64>) -> Self {
        Self {
            local_chain,
            supported: supported.into_iter().collect(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn local_chain(&self) -> u64 {
        self.local_chain
    }

    pub fn supports(&self, chain_id: u64) -> bool {
        chain_id != self.local_chain && self.supported.contains(&chain_id)
    }

    /// Handle for draining accepted exits.
    pub fn outbox(&self) -> ExitOutbox {
        ExitOutbox {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl Bridge for ExitQueue {
    fn check_exit(&self, request: &ExitRequest) -> Result<(), LedgerError> {
        if request.source_chain != self.local_chain {
            return Err(LedgerError::InvalidChain {
                chain_id: request.source_chain,
            });
        }
        if request.dest_chain == request.source_chain || !self.supports(request.dest_chain) {
            return Err(LedgerError::InvalidChain {
                chain_id: request.dest_chain,
            });
        }
        if request.amount == U256::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount: request.amount,
            });
        }
        Ok(())
    }

    fn exit(&mut self, request: ExitRequest) -> Result<(), LedgerError> {
        self.check_exit(&request)?;
        tracing::info!(
            dest_chain = request.dest_chain,
            to = %request.to,
            asset = %request.asset_out,
            amount = %request.amount,
            "Queued bridge exit"
        );
        lock(&self.queue).push_back(request);
        Ok(())
    }
}

impl ExitOutbox {
    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every queued exit, oldest first.
    pub fn drain(&self) -> Vec<ExitRequest> {
        lock(&self.queue).drain(..).collect()
    }
}

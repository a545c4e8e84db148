// crates/tessera-daemon/src/relay.rs
//
// Background relay loop: periodically drains exits accepted by the
// reference bridge and hands them to the destination chain. Delivery is
// log-only here; a real relayer would submit each exit to its chain.

use tessera_core::traits::ExitRequest;
use tessera_economics::ExitOutbox;

/// Run the relay loop forever, draining `outbox` every `interval_secs`.
pub async fn run_relay_loop(outbox: ExitOutbox, interval_secs: u64) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;
        let relayed = relay_once(&outbox);
        if relayed > 0 {
            tracing::info!("Relay: delivered {} exits", relayed);
        } else {
            tracing::trace!("Relay: outbox empty");
        }
    }
}

/// Drain the outbox once. Returns the number of exits relayed.
pub fn relay_once(outbox: &ExitOutbox) -> usize {
    let exits = outbox.drain();
    for exit in &exits {
        deliver(exit);
    }
    exits.len()
}

fn deliver(exit: &ExitRequest) {
    tracing::info!(
        source_chain = exit.source_chain,
        dest_chain = exit.dest_chain,
        from = %exit.from,
        to = %exit.to,
        asset_out = %exit.asset_out,
        amount = %exit.amount,
        "Relaying exit"
    );
}

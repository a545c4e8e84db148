// crates/tessera-daemon/src/main.rs
//
// Binary entrypoint for the Tessera ledger daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration, builds
// the ledger engine, spawns the exit relay, and serves JSON-RPC.

mod config;
mod node;
mod relay;

use std::sync::Arc;

use clap::Parser;
use config::{DaemonConfig, StoreBackend};

use tessera_rpc::{RpcConfig, TesseraRpcServer};

/// Tessera ledger daemon: staking rewards and fee-reserve swaps over a slot store.
#[derive(Parser, Debug)]
#[command(name = "tessera-daemon", version = "0.1.0", about = "Tessera ledger node daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.tessera/config.toml")]
    config: String,

    /// Keep ledger state in memory instead of RocksDB.
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config_path = expand_tilde(&args.config);
    let mut daemon_config = match DaemonConfig::load(&config_path) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            DaemonConfig::default()
        }
    };

    if args.ephemeral {
        daemon_config.store = StoreBackend::Memory;
    }

    let data_dir = expand_tilde(&daemon_config.data_dir);

    tracing::info!("Tessera Ledger Daemon v0.1.0");
    tracing::info!("Data directory: {}", data_dir);
    tracing::info!("Chain id: {}", daemon_config.ledger.chain_id);
    tracing::info!("Custody account: {}", daemon_config.ledger.custody);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );

    let node = node::build(&daemon_config, &data_dir)?;
    let engine = Arc::new(tokio::sync::Mutex::new(node.engine));

    if let Some(outbox) = node.outbox {
        let interval = daemon_config.bridge.relay_interval_secs;
        tokio::spawn(async move {
            relay::run_relay_loop(outbox, interval).await;
        });
    }

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = TesseraRpcServer::new(rpc_config, engine);

    tokio::select! {
        result = rpc_server.start() => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping daemon");
        }
    }

    Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

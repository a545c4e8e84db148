// crates/tessera-daemon/src/config.rs
//
// Runtime configuration for the Tessera ledger daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use tessera_core::address::{Address, Asset};
use tessera_core::amount::{decimal, U256};
use tessera_economics::LedgerConfig;

/// Which slot store backs the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StoreBackend {
    /// RocksDB under `data_dir`.
    #[serde(rename = "rocksdb")]
    RocksDb,
    /// Process memory; state is lost on exit.
    #[serde(rename = "memory")]
    Memory,
}

/// Reference bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// Register an `ExitQueue` bridge at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Destination chain ids the bridge accepts.
    #[serde(default)]
    pub supported_chains: Vec<u64>,

    /// How often the relay drains queued exits, in seconds.
    #[serde(default = "default_relay_interval_secs")]
    pub relay_interval_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            supported_chains: Vec::new(),
            relay_interval_secs: default_relay_interval_secs(),
        }
    }
}

/// Initial balance credited in the bank. A RocksDB-backed bank applies the
/// allocations once, on the first start against a fresh data directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenesisAllocation {
    pub asset: Asset,
    pub holder: Address,
    #[serde(with = "decimal")]
    pub amount: U256,
    /// Also approve the custody account for an unlimited amount, so the
    /// holder can stake and swap without a separate approval step.
    #[serde(default = "default_approve_custody")]
    pub approve_custody: bool,
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Slot store backend: "rocksdb" or "memory".
    #[serde(default = "default_store")]
    pub store: StoreBackend,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Admin, custody and chain id.
    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Balances minted into the bank on first start.
    #[serde(default)]
    pub genesis: Vec<GenesisAllocation>,
}

fn default_data_dir() -> String {
    "~/.tessera/data".to_string()
}

fn default_store() -> StoreBackend {
    StoreBackend::RocksDb
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50061
}

fn default_relay_interval_secs() -> u64 {
    5
}

fn default_approve_custody() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: default_store(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            ledger: LedgerConfig::default(),
            bridge: BridgeConfig::default(),
            genesis: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

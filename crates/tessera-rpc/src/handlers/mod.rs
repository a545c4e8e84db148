// crates/tessera-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group. Addresses travel as hex strings and amounts as
// decimal strings.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use tessera_core::address::{Address, Asset};
use tessera_core::amount::{decimal, parse_amount, U256};
use tessera_core::error::LedgerError;
use tessera_economics::LedgerEngine;

pub mod admin;
pub mod events;
pub mod staking;
pub mod swap;

/// The engine as shared between the server and its handlers.
///
/// A single async mutex totally orders every operation.
pub type SharedEngine = Arc<Mutex<LedgerEngine>>;

/// A single amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountResponse {
    #[serde(with = "decimal")]
    pub amount: U256,
}

impl From<U256> for AmountResponse {
    fn from(amount: U256) -> Self {
        Self { amount }
    }
}

pub(crate) fn parse_address(field: &str, value: &str) -> Result<Address, String> {
    Address::from_str(value).map_err(|e| format!("Invalid {}: {}", field, e))
}

pub(crate) fn parse_asset(field: &str, value: &str) -> Result<Asset, String> {
    Asset::from_str(value).map_err(|e| format!("Invalid {}: {}", field, e))
}

pub(crate) fn parse_amount_field(field: &str, value: &str) -> Result<U256, String> {
    parse_amount(value).map_err(|e| format!("Invalid {}: {}", field, e))
}

/// Ledger errors reach clients as their display string.
pub(crate) fn ledger_error(e: LedgerError) -> String {
    e.to_string()
}

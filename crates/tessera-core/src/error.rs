use thiserror::Error;

use crate::address::{Address, Asset};
use crate::amount::U256;

/// Ledger-wide error types for Tessera.
///
/// Every variant carries the offending value so a client can tell causes
/// apart without parsing the message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Null asset, or identical input/output assets.
    #[error("Invalid asset: {asset}")]
    InvalidAsset { asset: Asset },

    /// Zero amount where a positive amount is required.
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: U256 },

    /// Unstake request exceeds the caller's staked amount.
    #[error("Insufficient stake: requested {requested} but only {available} staked")]
    InsufficientStake { requested: U256, available: U256 },

    /// Reserve cannot cover the requested output.
    #[error("Insufficient reserve for {asset}: requested {requested} but only {available} available")]
    InsufficientReserve {
        asset: Asset,
        requested: U256,
        available: U256,
    },

    /// Fee rate above 100% (1e18).
    #[error("Fee too high: {rate} exceeds 1e18")]
    FeeTooHigh { rate: U256 },

    /// Cross-chain swap requested with no bridge registered.
    #[error("Bridge not configured")]
    BridgeNotConfigured,

    /// Admin-gated operation called by someone other than the admin.
    #[error("Unauthorized caller: {caller}")]
    Unauthorized { caller: Address },

    /// Request signature missing, malformed, or not made by the caller's key.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Request nonce not above the last one accepted for this caller.
    #[error("Stale nonce for {caller}: {nonce} is not above {last}")]
    StaleNonce { caller: Address, nonce: u64, last: U256 },

    /// No operation is registered under the given selector.
    #[error("Implementation not found for selector: {selector}")]
    ImplementationNotFound { selector: String },

    /// Holder balance too small for a transfer leg.
    #[error("Insufficient balance of {asset} for {holder}: requested {requested} but only {available} held")]
    InsufficientBalance {
        asset: Asset,
        holder: Address,
        requested: U256,
        available: U256,
    },

    /// Spender allowance too small for a transfer_from leg.
    #[error("Insufficient allowance of {asset} from {owner} to {spender}: requested {requested} but only {available} approved")]
    InsufficientAllowance {
        asset: Asset,
        owner: Address,
        spender: Address,
        requested: U256,
        available: U256,
    },

    /// Chain identifier rejected by the bridge.
    #[error("Invalid chain: {chain_id}")]
    InvalidChain { chain_id: u64 },

    /// 256-bit arithmetic overflowed.
    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// Storage layer error (RocksDB, encoding).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed request input (bad hex, bad decimal).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_values() {
        let err = LedgerError::InsufficientStake {
            requested: U256::new(500),
            available: U256::new(200),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stake: requested 500 but only 200 staked"
        );

        let err = LedgerError::FeeTooHigh {
            rate: U256::new(2_000_000_000_000_000_000),
        };
        assert!(err.to_string().contains("2000000000000000000"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let bad: Result<u32, _> = serde_json::from_str("not json");
        let err: LedgerError = bad.unwrap_err().into();
        assert!(matches!(err, LedgerError::Serialization(_)));
    }
}

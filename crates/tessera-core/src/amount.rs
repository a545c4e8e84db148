// crates/tessera-core/src/amount.rs
//
// Amount type and fixed-point helpers.
//
// Every balance, reserve, fee and index is an unsigned 256-bit integer.
// Fractions (fee rates, reward indices, user shares) are fixed-point numbers
// scaled by WAD = 10^18, so 1e18 represents 100%.

use std::str::FromStr;

pub use ethnum::U256;

use crate::error::LedgerError;

/// Fixed-point scale: 10^18 represents 1.0.
pub const WAD: U256 = U256::new(1_000_000_000_000_000_000);

/// Compute `a * b / denominator`, rounding down.
///
/// # Errors
/// Returns `LedgerError::ArithmeticOverflow` if the product does not fit in
/// 256 bits or the denominator is zero.
pub fn mul_div(
    a: U256,
    b: U256,
    denominator: U256,
    context: &'static str,
) -> Result<U256, LedgerError> {
    a.checked_mul(b)
        .and_then(|product| product.checked_div(denominator))
        .ok_or(LedgerError::ArithmeticOverflow { context })
}

/// Apply a WAD-scaled rate to an amount: `amount * rate / 1e18`.
pub fn apply_rate(amount: U256, rate: U256, context: &'static str) -> Result<U256, LedgerError> {
    mul_div(amount, rate, WAD, context)
}

/// Checked addition mapped onto the ledger error type.
pub fn checked_add(a: U256, b: U256, context: &'static str) -> Result<U256, LedgerError> {
    a.checked_add(b)
        .ok_or(LedgerError::ArithmeticOverflow { context })
}

/// Parse a base-10 amount string.
pub fn parse_amount(s: &str) -> Result<U256, LedgerError> {
    U256::from_str(s.trim())
        .map_err(|e| LedgerError::InvalidInput(format!("Invalid amount '{}': {}", s, e)))
}

/// Serde adapter that encodes `U256` as a decimal string.
///
/// JSON numbers cannot carry 256-bit values, so amounts always travel as
/// strings. Use with `#[serde(with = "tessera_core::amount::decimal")]`.
pub mod decimal {
    use super::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_amount(&s).map_err(serde::de::Error::custom)
    }
}

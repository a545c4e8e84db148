// crates/tessera-core/src/address.rs
//
// Account and asset identifiers.
//
// Both are 20-byte opaque identifiers rendered as `0x`-prefixed lowercase
// hex. The all-zero address is the null identity and is never a valid asset.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::crypto::hash_bytes;
use crate::error::LedgerError;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// An account identifier (user, custody account, admin, recipient).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The null identity.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Build an address whose last byte is `tag`. Handy for fixtures.
    pub const fn from_low_byte(tag: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = tag;
        Address(bytes)
    }

    /// The address controlled by an ed25519 public key: the first 20 bytes
    /// of SHA-256 over the key.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let digest = hash_bytes(public_key);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| LedgerError::InvalidInput(format!("Invalid address hex '{}': {}", s, e)))?;
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            LedgerError::InvalidInput(format!(
                "Address '{}' must be exactly {} bytes",
                s, ADDRESS_LEN
            ))
        })?;
        Ok(Address(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A fungible-token identifier.
///
/// Carries no attributes beyond identity; balances live in the external
/// asset-transfer capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Asset(pub Address);

impl Asset {
    /// The null asset.
    pub const NULL: Asset = Asset(Address::ZERO);

    pub const fn from_low_byte(tag: u8) -> Self {
        Asset(Address::from_low_byte(tag))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_zero()
    }

    pub fn address(&self) -> Address {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Asset {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_str(s).map(Asset)
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Asset(address)
    }
}

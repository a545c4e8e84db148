// crates/tessera-rpc/src/auth.rs
//
// Request authentication for mutating operations.
//
// A mutating request carries an `auth` block with the signer's hex ed25519
// public key, a nonce, and a hex signature over
//
//   "tessera:" + operation name + ":" + nonce + ":" + JSON params
//
// The `caller` in the params must be the address derived from that key.
// The nonce must be above the last one the ledger accepted from the caller.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use tessera_core::address::Address;
use tessera_core::crypto::{public_key_bytes, sign_message, verify_signature};
use tessera_core::error::LedgerError;
use tessera_core::operation::Operation;

use crate::server::JsonRpcRequest;

/// Signature block attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAuth {
    /// Hex-encoded ed25519 public key of the signer.
    pub public_key: String,
    /// Must be above every nonce previously accepted from this caller.
    pub nonce: u64,
    /// Hex-encoded signature over the signing payload.
    pub signature: String,
}

/// The caller a request was proven to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedCaller {
    pub caller: Address,
    pub nonce: u64,
}

/// Bytes a client signs for `op` with `params` at `nonce`.
///
/// The operation's canonical name is signed, so a request addressed by
/// selector verifies the same way as one addressed by name.
pub fn signing_payload(
    op: Operation,
    nonce: u64,
    params: &serde_json::Value,
) -> Result<Vec<u8>, LedgerError> {
    let mut payload = format!("tessera:{}:{}:", op.name(), nonce).into_bytes();
    payload.extend(serde_json::to_vec(params)?);
    Ok(payload)
}

/// Build a signed request for `op`. Client and test helper.
pub fn sign_request(
    signing_key: &[u8; 32],
    op: Operation,
    params: serde_json::Value,
    nonce: u64,
) -> Result<JsonRpcRequest, LedgerError> {
    let payload = signing_payload(op, nonce, &params)?;
    let signature = sign_message(signing_key, &payload);
    Ok(JsonRpcRequest {
        method: op.name().to_string(),
        params,
        auth: Some(RequestAuth {
            public_key: hex::encode(public_key_bytes(signing_key)),
            nonce,
            signature: hex::encode(signature),
        }),
    })
}

/// Check the signature on a request for `op`.
///
/// Read-only operations need none and yield `Ok(None)`.
///
/// # Errors
/// `InvalidSignature` if the auth block is missing, malformed, or does not
/// verify; `Unauthorized` if the params name a caller other than the signer.
pub fn verify_request(
    op: Operation,
    params: &serde_json::Value,
    auth: Option<&RequestAuth>,
) -> Result<Option<VerifiedCaller>, LedgerError> {
    if !op.is_mutating() {
        return Ok(None);
    }
    let auth = auth.ok_or_else(|| {
        LedgerError::InvalidSignature(format!("{} requires a signed request", op.name()))
    })?;

    let public_key: [u8; 32] = hex::decode(&auth.public_key)
        .map_err(|e| LedgerError::InvalidSignature(format!("Invalid public key hex: {}", e)))?
        .try_into()
        .map_err(|_| LedgerError::InvalidSignature("Public key must be 32 bytes".to_string()))?;
    let signature = hex::decode(&auth.signature)
        .map_err(|e| LedgerError::InvalidSignature(format!("Invalid signature hex: {}", e)))?;

    let payload = signing_payload(op, auth.nonce, params)?;
    if !verify_signature(&public_key, &payload, &signature)? {
        return Err(LedgerError::InvalidSignature(
            "Signature does not match request".to_string(),
        ));
    }

    let signer = Address::from_public_key(&public_key);
    let claimed = params
        .get("caller")
        .and_then(|v| v.as_str())
        .ok_or_else(|| LedgerError::InvalidInput("Missing caller".to_string()))?;
    let claimed = Address::from_str(claimed)?;
    if claimed != signer {
        tracing::warn!(%claimed, %signer, op = op.name(), "Caller does not match signing key");
        return Err(LedgerError::Unauthorized { caller: claimed });
    }

    Ok(Some(VerifiedCaller {
        caller: signer,
        nonce: auth.nonce,
    }))
}

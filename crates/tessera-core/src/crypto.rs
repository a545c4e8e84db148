// crates/tessera-core/src/crypto.rs

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::LedgerError;

/// Public key bytes (32 bytes) for the given signing key bytes.
pub fn public_key_bytes(signing_key_bytes: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(signing_key_bytes)
        .verifying_key()
        .to_bytes()
}

/// Sign a message with the given signing key bytes.
///
/// Returns the ed25519 signature as a 64-byte vector.
pub fn sign_message(signing_key_bytes: &[u8; 32], message: &[u8]) -> Vec<u8> {
    let signing_key = SigningKey::from_bytes(signing_key_bytes);
    signing_key.sign(message).to_bytes().to_vec()
}

/// Verify an ed25519 signature.
///
/// Returns `true` if the signature is valid for the given message and public key.
pub fn verify_signature(
    public_key_bytes: &[u8; 32],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool, LedgerError> {
    let verifying_key = VerifyingKey::from_bytes(public_key_bytes)
        .map_err(|e| LedgerError::InvalidSignature(format!("Invalid public key: {}", e)))?;

    let signature_array: [u8; 64] = signature_bytes.try_into().map_err(|_| {
        LedgerError::InvalidSignature("Signature must be exactly 64 bytes".to_string())
    })?;

    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Compute SHA-256 hash of the given bytes.
///
/// Returns a 32-byte hash.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a sequence of parts with a 4-byte big-endian length prefix on each.
///
/// The length prefix keeps `["ab", "c"]` and `["a", "bc"]` from colliding.
pub fn hash_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u32).to_be_bytes());
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes() {
        let data = b"tessera";
        let hash = hash_bytes(data);
        assert_eq!(hash.len(), 32);

        // Same input should produce same hash
        let hash2 = hash_bytes(data);
        assert_eq!(hash, hash2);

        // Different input should produce different hash
        let hash3 = hash_bytes(b"different");
        assert_ne!(hash, hash3);
    }

    #[test]
    fn test_sign_and_verify() {
        let secret = [3u8; 32];
        let public = public_key_bytes(&secret);
        let sig = sign_message(&secret, b"staking/stake");
        assert_eq!(sig.len(), 64);
        assert!(verify_signature(&public, b"staking/stake", &sig).unwrap());
        assert!(!verify_signature(&public, b"staking/unstake", &sig).unwrap());

        let other = public_key_bytes(&[4u8; 32]);
        assert!(!verify_signature(&other, b"staking/stake", &sig).unwrap());
        assert!(verify_signature(&public, b"staking/stake", &sig[..63]).is_err());
    }

    #[test]
    fn test_hash_parts_is_boundary_sensitive() {
        assert_ne!(hash_parts(&[b"ab", b"c"]), hash_parts(&[b"a", b"bc"]));
        assert_eq!(hash_parts(&[b"ab", b"c"]), hash_parts(&[b"ab", b"c"]));
    }
}

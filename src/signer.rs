//! Keyed hashing (HMAC-SHA-256)
//!
//! Produces hex-encoded authentication tags over byte payloads.

use crate::error::SignError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA-256 of `payload` under `secret_key`, hex encoded.
///
/// HMAC accepts keys of any length, so the error path is not expected in practice.
pub fn hmac_sha256(secret_key: &str, payload: &[u8]) -> Result<String, SignError> {
    KeyedHashSigner::new(secret_key).sign(payload)
}

/// Reusable signer bound to one secret key.
#[derive(Clone)]
pub struct KeyedHashSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for KeyedHashSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedHashSigner")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl KeyedHashSigner {
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret_key.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, SignError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| SignError::InvalidKey(e.to_string()))
    }

    /// Hex-encoded tag for `payload`.
    pub fn sign(&self, payload: &[u8]) -> Result<String, SignError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a hex-encoded tag in constant time. Malformed hex never verifies.
    pub fn verify(&self, payload: &[u8], tag_hex: &str) -> Result<bool, SignError> {
        let Ok(tag) = hex::decode(tag_hex) else {
            return Ok(false);
        };
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.verify_slice(&tag).is_ok())
    }
}

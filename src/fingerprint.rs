//! Identity fingerprints for structured values
//!
//! A fingerprint is a short token derived from a value's canonical form:
//! FNV-1a (32-bit) over the canonical UTF-8 bytes, rendered as a zero-padded
//! decimal and re-encoded digit by digit into an alphabet without vowels or
//! look-alike characters, so the token is safe to use as a label value.
//!
//! Fingerprints detect change; they are not collision resistant and must
//! never be used for authentication.

use crate::canonical::{canonicalize, canonicalize_serde, Canonical};
use serde::Serialize;
use std::fmt;

/// Alphabet for label-safe encoding (no vowels, no `0`, `1`, `3`).
const ALPHANUMS: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Width of every fingerprint token.
pub const FINGERPRINT_LEN: usize = 10;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Fixed-width, label-safe identity token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

/// FNV-1a, 32-bit.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV32_PRIME)
    })
}

/// Map every character onto [`ALPHANUMS`] by code point.
pub fn safe_encode(s: &str) -> String {
    s.chars()
        .map(|c| ALPHANUMS[(c as usize) % ALPHANUMS.len()] as char)
        .collect()
}

/// Fingerprint of an already-canonical text.
pub fn fingerprint_canonical(canonical: &str) -> Fingerprint {
    let hash = fnv1a_32(canonical.as_bytes());
    Fingerprint(safe_encode(&format!("{:0width$}", hash, width = FINGERPRINT_LEN)))
}

/// Fingerprint of any [`Canonical`] value.
pub fn fingerprint<T: Canonical + ?Sized>(value: &T) -> Fingerprint {
    fingerprint_canonical(&canonicalize(value))
}

/// Fingerprint of any `Serialize` value.
pub fn fingerprint_serde<T: Serialize + ?Sized>(value: &T) -> Fingerprint {
    fingerprint_canonical(&canonicalize_serde(value))
}

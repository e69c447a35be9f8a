//! deephash: deterministic hashing of in-memory values and directory trees
//!
//! - [`canonical`] renders any supported value as a canonical text, so
//!   structurally equal values render identically
//! - [`fingerprint`] turns that text into a short label-safe token
//! - [`signer`] computes HMAC-SHA-256 tags
//! - [`tree`] digests directory trees by content, with [`ignore`] filters

pub mod canonical;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod ignore;
pub mod logging;
pub mod signer;
pub mod tree;

pub use canonical::{canonicalize, Canonical};
pub use error::{ApiError, HashError, PatternError, SignError};
pub use fingerprint::{fingerprint, fingerprint_serde, Fingerprint};
pub use ignore::{FilterChain, IgnorePatterns, PathFilter};
pub use signer::{hmac_sha256, KeyedHashSigner};
pub use tree::{hash_folder, Algorithm, CancelToken, Digest, TreeDigester};

//! Integration tests for the deephash hashing engine

mod canonical_fingerprint;
mod cli;
mod signer_vectors;

//! Error types for the deephash hashing engine.
//!
//! Canonicalization and fingerprinting never fail, so they have no error type.

use std::path::PathBuf;
use thiserror::Error;

/// Directory traversal and digest errors
#[derive(Debug, Error)]
pub enum HashError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported entry type at {0:?} (only files, directories and symlinks are hashed)")]
    UnsupportedEntry(PathBuf),

    #[error("Directory digest cancelled")]
    Cancelled,

    #[error("Failed to encode digest list: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl HashError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HashError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the computation was stopped by the caller rather than by a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HashError::Cancelled)
    }
}

impl From<walkdir::Error> for HashError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = match err.into_io_error() {
            Some(io) => io,
            None => std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop detected"),
        };
        HashError::Io { path, source }
    }
}

/// Keyed hash errors
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Failed to initialize keyed hash: {0}")]
    InvalidKey(String),
}

/// Ignore pattern compilation errors
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Illegal exclusion pattern: {0:?}")]
    IllegalExclusion(String),

    #[error("Unterminated character class in pattern {0:?}")]
    UnterminatedClass(String),

    #[error("Trailing escape in pattern {0:?}")]
    TrailingEscape(String),

    #[error("Invalid pattern {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Digest string parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestParseError {
    #[error("Digest is missing the '<algorithm>:' prefix: {0:?}")]
    MissingAlgorithm(String),

    #[error("Unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid digest hex for {algorithm}: expected {expected} lowercase hex characters")]
    InvalidHex {
        algorithm: &'static str,
        expected: usize,
    },
}

/// Errors surfaced by the configuration and command-line layers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Hash error: {0}")]
    Hash(#[from] HashError),

    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Digest error: {0}")]
    Digest(#[from] DigestParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global config file,
//! the workspace `config/` directory and `DEEPHASH__` environment variables,
//! merged in that order. The loaded configuration is validated as a whole so
//! every problem is reported at once.

use crate::ignore::IgnorePatterns;
use crate::logging::LoggingConfig;
use crate::tree::digest::Algorithm;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeephashConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory digest settings
    #[serde(default)]
    pub tree: TreeConfig,
}

/// Directory digest settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Digest algorithm for leaves and the aggregate
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Ignore patterns applied to every digest, before any given on the command line
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl TreeConfig {
    /// Compile the configured ignore patterns.
    pub fn ignore(&self) -> Result<IgnorePatterns, crate::error::PatternError> {
        IgnorePatterns::new(&self.ignore_patterns)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Logging(String),
    Tree(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
            ValidationError::Tree(msg) => write!(f, "Tree: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DeephashConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        for pattern in &self.tree.ignore_patterns {
            if let Err(e) = IgnorePatterns::new([pattern]) {
                errors.push(ValidationError::Tree(e.to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

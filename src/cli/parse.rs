//! CLI parse: clap types for deephash. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// deephash - deterministic fingerprints, keyed hashes and directory digests
#[derive(Debug, Parser)]
#[command(name = "deephash")]
#[command(about = "Deterministic fingerprints, keyed hashes and directory tree digests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where config/ is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Digest one or more directory trees
    Tree {
        /// Roots to digest
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Ignore pattern, applied after configured patterns (repeatable)
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Digest algorithm (sha256, sha384, sha512)
        #[arg(long)]
        algorithm: Option<String>,

        /// Also print every leaf digest that feeds the tree digest
        #[arg(long)]
        list: bool,

        /// Cancel the digest after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Fingerprint a structured document
    Fingerprint {
        /// Document to read (stdin when omitted)
        file: Option<PathBuf>,

        /// Document format
        #[arg(long, value_enum, default_value_t = DocumentFormat::Json)]
        format: DocumentFormat,

        /// Print the canonical form instead of the fingerprint
        #[arg(long)]
        canonical: bool,
    },
    /// Compute the HMAC-SHA-256 of a payload
    Sign {
        /// Payload file (stdin when omitted)
        file: Option<PathBuf>,

        /// Secret key
        #[arg(long, conflicts_with = "key_env", required_unless_present = "key_env")]
        key: Option<String>,

        /// Name of an environment variable holding the secret key
        #[arg(long, value_name = "VAR")]
        key_env: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

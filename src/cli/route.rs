//! CLI route: single route table and run context. Dispatches to domain services and output.

use crate::canonical::canonicalize;
use crate::cli::output::{format_tree_line, format_tree_listing};
use crate::cli::parse::{Commands, DocumentFormat};
use crate::config::{ConfigLoader, DeephashConfig};
use crate::error::{ApiError, HashError};
use crate::fingerprint::fingerprint;
use crate::ignore::IgnorePatterns;
use crate::signer::hmac_sha256;
use crate::tree::cancel::CancelToken;
use crate::tree::digest::Algorithm;
use crate::tree::digester::TreeDigester;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: workspace, config path and loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: DeephashConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        Ok(Self {
            workspace_root,
            config,
        })
    }

    /// Context over an already loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: DeephashConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Tree {
                roots,
                ignore,
                algorithm,
                list,
                timeout_ms,
            } => self.handle_tree(roots, ignore, algorithm.as_deref(), *list, *timeout_ms),
            Commands::Fingerprint {
                file,
                format,
                canonical,
            } => self.handle_fingerprint(file.as_deref(), *format, *canonical),
            Commands::Sign { file, key, key_env } => {
                self.handle_sign(file.as_deref(), key.as_deref(), key_env.as_deref())
            }
        };
        debug!(
            workspace = %self.workspace_root.display(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn handle_tree(
        &self,
        roots: &[PathBuf],
        ignore: &[String],
        algorithm: Option<&str>,
        list: bool,
        timeout_ms: Option<u64>,
    ) -> Result<String, ApiError> {
        let algorithm = match algorithm {
            Some(name) => name.parse::<Algorithm>()?,
            None => self.config.tree.algorithm,
        };

        // Configured patterns first, so a command-line `!pattern` can re-include.
        let patterns = IgnorePatterns::new(self.config.tree.ignore_patterns.iter().chain(ignore))?;
        let mut digester = TreeDigester::new().with_algorithm(algorithm);
        if !patterns.is_empty() {
            digester = digester.with_filter(patterns);
        }

        let cancel = match timeout_ms {
            Some(ms) => CancelToken::with_timeout(Duration::from_millis(ms)),
            None => CancelToken::new(),
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Runtime(format!("Failed to create runtime: {}", e)))?;
        let outputs = runtime.block_on(digest_roots(
            Arc::new(digester),
            roots.to_vec(),
            list,
            cancel,
        ))?;
        Ok(outputs.join("\n"))
    }

    fn handle_fingerprint(
        &self,
        file: Option<&Path>,
        format: DocumentFormat,
        canonical: bool,
    ) -> Result<String, ApiError> {
        let text = String::from_utf8(read_input(file)?)
            .map_err(|e| ApiError::InvalidInput(format!("Document is not UTF-8: {}", e)))?;
        let document = parse_document(&text, format)?;
        if canonical {
            Ok(canonicalize(&document))
        } else {
            Ok(fingerprint(&document).to_string())
        }
    }

    fn handle_sign(
        &self,
        file: Option<&Path>,
        key: Option<&str>,
        key_env: Option<&str>,
    ) -> Result<String, ApiError> {
        let key = match (key, key_env) {
            (Some(key), _) => key.to_string(),
            (None, Some(var)) => std::env::var(var).map_err(|_| {
                ApiError::InvalidInput(format!("Environment variable {} is not set", var))
            })?,
            (None, None) => {
                return Err(ApiError::InvalidInput(
                    "A key is required (--key or --key-env)".to_string(),
                ))
            }
        };
        let payload = read_input(file)?;
        Ok(hmac_sha256(&key, &payload)?)
    }
}

/// Digest every root on the blocking pool; Ctrl-C cancels all of them.
/// Outputs keep the order of `roots`; the first failure in that order is returned.
async fn digest_roots(
    digester: Arc<TreeDigester>,
    roots: Vec<PathBuf>,
    list: bool,
    cancel: CancelToken,
) -> Result<Vec<String>, ApiError> {
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling tree digests");
            interrupt.cancel();
        }
    });

    let handles: Vec<_> = roots
        .into_iter()
        .map(|root| {
            let digester = Arc::clone(&digester);
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || digest_root(&digester, &root, list, &cancel))
        })
        .collect();

    let mut outputs = Vec::with_capacity(handles.len());
    let mut first_error: Option<ApiError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(output)) => outputs.push(output),
            Ok(Err(e)) => {
                first_error.get_or_insert(e.into());
            }
            Err(e) => {
                first_error.get_or_insert(ApiError::Runtime(format!("Digest task failed: {}", e)));
            }
        }
    }
    watcher.abort();

    match first_error {
        Some(e) => Err(e),
        None => {
            info!(roots = outputs.len(), "Tree digests complete");
            Ok(outputs)
        }
    }
}

fn digest_root(
    digester: &TreeDigester,
    root: &Path,
    list: bool,
    cancel: &CancelToken,
) -> Result<String, HashError> {
    if list {
        let leaves = digester.file_digests_with_cancel(root, cancel)?;
        let digest = digester.aggregate(&leaves)?;
        Ok(format_tree_listing(&leaves, &digest, root))
    } else {
        let digest = digester.digest_with_cancel(root, cancel)?;
        Ok(format_tree_line(&digest, root))
    }
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>, ApiError> {
    match file {
        Some(path) => std::fs::read(path).map_err(|e| {
            ApiError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        }),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn parse_document(text: &str, format: DocumentFormat) -> Result<serde_json::Value, ApiError> {
    let parsed = match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| ApiError::InvalidInput(format!("Invalid {:?} document: {}", format, e)))
}

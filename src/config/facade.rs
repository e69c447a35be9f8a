//! Config facade: the only entry points the rest of the crate uses to obtain configuration.

use crate::config::merge::service::MergeService;
use crate::config::DeephashConfig;
use config::ConfigError;
use std::path::Path;
use tracing::debug;

/// Loads [`DeephashConfig`] from the layered sources.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global config file,
    /// `config/config.toml`, `config/<DEEPHASH_ENV>.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<DeephashConfig, ConfigError> {
        let config = MergeService::for_workspace(workspace_root)
            .build()?
            .try_deserialize::<DeephashConfig>()?;
        debug!(
            workspace = %workspace_root.display(),
            algorithm = %config.tree.algorithm,
            ignore_patterns = config.tree.ignore_patterns.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from one explicit file; defaults and the
    /// environment still apply, other files do not.
    pub fn load_from_file(path: &Path) -> Result<DeephashConfig, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        MergeService::for_file(path)
            .build()?
            .try_deserialize::<DeephashConfig>()
    }
}

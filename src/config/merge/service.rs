//! Assembles the source layers in precedence order.

use crate::config::merge::merge_policy;
use crate::config::sources::{environment, global_file, workspace_file};
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};

enum Layers {
    Workspace(PathBuf),
    ExplicitFile(PathBuf),
}

/// Builds a merged [`Config`] from defaults, files and the environment.
pub struct MergeService {
    layers: Layers,
}

impl MergeService {
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self {
            layers: Layers::Workspace(workspace_root.to_path_buf()),
        }
    }

    pub fn for_file(path: &Path) -> Self {
        Self {
            layers: Layers::ExplicitFile(path.to_path_buf()),
        }
    }

    pub fn build(&self) -> Result<Config, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = match &self.layers {
            Layers::Workspace(root) => {
                let builder = global_file::add_to_builder(builder)?;
                workspace_file::add_to_builder(builder, root)?
            }
            Layers::ExplicitFile(path) => builder.add_source(File::from(path.as_path())),
        };
        environment::add_to_builder(builder).build()
    }
}

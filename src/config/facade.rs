//! Entry point for loading [`ShardfoldConfig`].

use super::merge::merge_policy::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::ShardfoldConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace file and environment, then validate.
    pub fn load(workspace_root: &Path) -> Result<ShardfoldConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Load an explicit file in place of the global and workspace files.
    pub fn load_from_file(path: &Path) -> Result<ShardfoldConfig, ApiError> {
        let builder = builder_with_defaults()?.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);
        Self::finish(builder)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<ShardfoldConfig, ApiError> {
        let config: ShardfoldConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }
}

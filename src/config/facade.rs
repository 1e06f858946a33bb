//! Config loading facade: assembles sources in precedence order and validates the result.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::StudioConfig;
use crate::error::StudioError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config for a workspace: defaults, global file, workspace files, environment.
    pub fn load(workspace_root: &Path) -> Result<StudioConfig, StudioError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        let config: StudioConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Self::validated(config)
    }

    /// Load a single explicit file on top of defaults and environment.
    pub fn load_from_file(path: &Path) -> Result<StudioConfig, StudioError> {
        if !path.exists() {
            return Err(StudioError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);
        let config: StudioConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    fn validated(config: StudioConfig) -> Result<StudioConfig, StudioError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            StudioError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}

//! Studio workspace overrides: `config/config.toml`, then the profile file named by
//! `REELSMITH_ENV` (default `development`).

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROFILE_ENV_VAR: &str = "REELSMITH_ENV";
const DEFAULT_PROFILE: &str = "development";

fn active_profile() -> String {
    std::env::var(PROFILE_ENV_VAR)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Workspace files that exist, lowest precedence first.
pub fn workspace_layers(workspace_root: &Path) -> Vec<PathBuf> {
    let dir = workspace_root.join("config");
    [
        dir.join("config.toml"),
        dir.join(format!("{}.toml", active_profile())),
    ]
    .into_iter()
    .filter(|path| path.is_file())
    .collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(workspace_layers(workspace_root)
        .into_iter()
        .fold(builder, |builder, path| {
            debug!(path = %path.display(), "Workspace config layer");
            builder.add_source(File::from(path).required(false))
        }))
}

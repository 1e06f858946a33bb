//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
/// The remaining fields fall back to serde defaults on `StudioConfig`.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("api.base_url", super::super::default_base_url())?
        .set_default("poll.interval_secs", 10)?
        .set_default("status.interval_secs", 8)?
        .set_default("output.dir", "studio-output")
}

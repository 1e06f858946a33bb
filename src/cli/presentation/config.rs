//! Config presentation: effective configuration with the credential redacted.

use crate::config::StudioConfig;
use crate::error::StudioError;

fn credential_label(has_credential: bool) -> &'static str {
    if has_credential {
        "configured (redacted)"
    } else {
        "missing"
    }
}

pub fn format_config_toml(
    config: &StudioConfig,
    has_credential: bool,
) -> Result<String, StudioError> {
    let body = toml::to_string_pretty(config)
        .map_err(|e| StudioError::ConfigError(format!("Failed to render config: {}", e)))?;
    Ok(format!(
        "# credential: {}\n{}",
        credential_label(has_credential),
        body
    ))
}

pub fn format_config_json(
    config: &StudioConfig,
    has_credential: bool,
) -> Result<String, StudioError> {
    let mut value = serde_json::to_value(config)
        .map_err(|e| StudioError::ConfigError(format!("Failed to render config: {}", e)))?;
    if let Some(map) = value.as_object_mut() {
        map.insert(
            "credential".to_string(),
            serde_json::Value::String(credential_label(has_credential).to_string()),
        );
    }
    serde_json::to_string_pretty(&value)
        .map_err(|e| StudioError::ConfigError(format!("Failed to render config: {}", e)))
}

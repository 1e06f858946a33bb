//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::StudioError;
use crate::studio::CREDENTIAL_REMEDIATION;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &StudioError) -> String {
    match e {
        StudioError::InvalidInput(msg) => format!("error: {}", msg),
        StudioError::ConfigError(msg) => format!("config error: {}", msg),
        other if other.is_credential_failure() => {
            format!("error: {}\n  ({})", CREDENTIAL_REMEDIATION, other)
        }
        other => format!("error: {}", other),
    }
}

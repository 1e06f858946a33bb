//! Error types for the reelsmith media studio.

use crate::types::LifecycleState;
use thiserror::Error;

/// Phrase the backend uses when the referenced credential (or model) does not exist.
pub const MISSING_ENTITY_SIGNATURE: &str = "entity was not found";

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot {action} while studio is {from}")]
    InvalidTransition {
        from: LifecycleState,
        action: &'static str,
    },

    #[error("{0}")]
    PromptGeneration(String),

    #[error("{0}")]
    ImageGeneration(String),

    #[error("{0}")]
    VideoGeneration(String),

    #[error("{0}")]
    VideoDownload(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider resource not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Asset store error: {0}")]
    AssetStore(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// True when the failure means the configured credential is missing or rejected.
    pub fn is_credential_failure(&self) -> bool {
        match self {
            StudioError::ProviderAuthFailed(_) | StudioError::CredentialUnavailable(_) => true,
            other => other
                .to_string()
                .to_ascii_lowercase()
                .contains(MISSING_ENTITY_SIGNATURE),
        }
    }
}

impl From<config::ConfigError> for StudioError {
    fn from(err: config::ConfigError) -> Self {
        StudioError::ConfigError(err.to_string())
    }
}

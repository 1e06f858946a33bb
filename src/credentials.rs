//! Credential capability
//!
//! The hosting environment owns the API credential. The studio only asks whether one is
//! configured, asks the host to (re)select one, and reads the current value on every backend
//! call so that a freshly selected key takes effect immediately.

use crate::error::StudioError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variables consulted for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Whether a usable credential is currently configured.
    async fn has_credential(&self) -> bool;

    /// Open the host's credential-selection flow.
    async fn request_credential(&self) -> Result<(), StudioError>;

    /// The credential to attach to the next backend request.
    fn current(&self) -> Option<String>;
}

/// Session-scoped key slot shared between a provider and its readers.
#[derive(Debug, Clone, Default)]
pub struct CredentialSlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl CredentialSlot {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial.filter(|k| !k.trim().is_empty()))),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    pub fn set(&self, key: String) {
        *self.inner.write() = Some(key);
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads the key from the environment and, when interactive, prompts the terminal user to
/// select a new one.
pub struct EnvCredentials {
    slot: CredentialSlot,
    interactive: bool,
}

impl EnvCredentials {
    pub fn from_env(interactive: bool) -> Self {
        let key = API_KEY_ENV_VARS.iter().find_map(|name| {
            let value = non_empty_env(name);
            if value.is_some() {
                debug!(source = name, "API key loaded from environment");
            }
            value
        });
        Self {
            slot: CredentialSlot::new(key),
            interactive,
        }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn has_credential(&self) -> bool {
        self.slot.get().is_some()
    }

    async fn request_credential(&self) -> Result<(), StudioError> {
        if !self.interactive {
            warn!("Credential selection requested in non-interactive mode");
            return Err(StudioError::CredentialUnavailable(format!(
                "set one of {} or run interactively",
                API_KEY_ENV_VARS.join(", ")
            )));
        }

        let key = tokio::task::spawn_blocking(|| {
            dialoguer::Password::new()
                .with_prompt("Gemini API key")
                .interact()
        })
        .await
        .map_err(|e| StudioError::CredentialUnavailable(format!("Prompt task failed: {}", e)))?
        .map_err(|e| {
            StudioError::CredentialUnavailable(format!("Failed to get user input: {}", e))
        })?;

        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(StudioError::CredentialUnavailable(
                "No API key entered".to_string(),
            ));
        }
        self.slot.set(key);
        info!("API key selected for this session");
        Ok(())
    }

    fn current(&self) -> Option<String> {
        self.slot.get()
    }
}

/// Fixed credential for embedding and tests. Counts selection requests; a request can
/// optionally install a replacement key.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    slot: CredentialSlot,
    replacement: Option<String>,
    requests: AtomicUsize,
}

impl StaticCredentials {
    pub fn new(key: Option<&str>) -> Self {
        Self {
            slot: CredentialSlot::new(key.map(str::to_string)),
            replacement: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Key installed whenever `request_credential` is called.
    pub fn with_replacement(mut self, key: &str) -> Self {
        self.replacement = Some(key.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn has_credential(&self) -> bool {
        self.slot.get().is_some()
    }

    async fn request_credential(&self) -> Result<(), StudioError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(key) = &self.replacement {
            self.slot.set(key.clone());
        }
        Ok(())
    }

    fn current(&self) -> Option<String> {
        self.slot.get()
    }
}

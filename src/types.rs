//! Shared data contracts for one generation cycle.

use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product identity collected from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
}

impl ProductDetails {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Both fields must carry non-whitespace content before a cycle can start.
    pub fn validate(&self) -> Result<(), StudioError> {
        if self.name.trim().is_empty() {
            return Err(StudioError::InvalidInput(
                "Product name cannot be empty".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(StudioError::InvalidInput(
                "Product description cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The matched prompt pair produced by the prompt stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPrompts {
    pub image_prompt: String,
    pub video_prompt: String,
}

/// Media produced by the render stage. Each renderer writes only its own field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Lifecycle of the studio. Exactly one value at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Idle,
    GeneratingPrompts,
    PromptsReady,
    GeneratingMedia,
    Completed,
    Error,
}

impl LifecycleState {
    /// Whether product inputs may be edited (and a new cycle submitted).
    pub fn accepts_input(self) -> bool {
        matches!(self, LifecycleState::Idle | LifecycleState::Error)
    }

    /// Whether a backend call is currently in flight.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            LifecycleState::GeneratingPrompts | LifecycleState::GeneratingMedia
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::GeneratingPrompts => "generating_prompts",
            LifecycleState::PromptsReady => "prompts_ready",
            LifecycleState::GeneratingMedia => "generating_media",
            LifecycleState::Completed => "completed",
            LifecycleState::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which renderer an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Raw bytes of a rendered asset together with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl MediaAsset {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// File extension derived from the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "video/mp4" => "mp4",
            "video/webm" => "webm",
            "video/quicktime" => "mov",
            _ => "bin",
        }
    }
}

//! Configuration System
//!
//! Layered runtime configuration for the studio: backend endpoint and timeouts, model ids,
//! media options, polling bounds, status ticker cadence, output location and logging.
//! Sources merge in order defaults → global file → workspace files → environment.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub models: ModelConfig,

    #[serde(default)]
    pub image: ImageSettings,

    #[serde(default)]
    pub video: VideoSettings,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend endpoint and HTTP timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Per-request ceiling; video downloads share it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

pub(crate) fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Model identifiers per stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_prompt_model")]
    pub prompt: String,
    #[serde(default = "default_image_model")]
    pub image: String,
    #[serde(default = "default_video_model")]
    pub video: String,
}

fn default_prompt_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_image_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt_model(),
            image: default_image_model(),
            video: default_video_model(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSettings {
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

fn default_image_size() -> String {
    "1K".to_string()
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: default_aspect_ratio(),
            image_size: default_image_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSettings {
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_number_of_videos")]
    pub number_of_videos: u32,
}

fn default_resolution() -> String {
    "1080p".to_string()
}

fn default_number_of_videos() -> u32 {
    1
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: default_aspect_ratio(),
            resolution: default_resolution(),
            number_of_videos: default_number_of_videos(),
        }
    }
}

/// Video job polling. `max_attempts = None` polls until the job reports done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

fn default_poll_interval_secs() -> u64 {
    10
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            max_attempts: None,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Cosmetic video status text cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_status_interval_secs")]
    pub interval_secs: u64,
}

fn default_status_interval_secs() -> u64 {
    8
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_status_interval_secs(),
        }
    }
}

impl StatusConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory rendered assets are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("studio-output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Api(String),
    Model(String, String),
    Poll(String),
    Status(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Api(msg) => write!(f, "API: {}", msg),
            ValidationError::Model(stage, msg) => write!(f, "Model '{}': {}", stage, msg),
            ValidationError::Poll(msg) => write!(f, "Poll: {}", msg),
            ValidationError::Status(msg) => write!(f, "Status: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StudioConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            errors.push(ValidationError::Api("Base URL cannot be empty".to_string()));
        } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            errors.push(ValidationError::Api(format!(
                "Base URL must start with http:// or https:// (got '{}')",
                base_url
            )));
        }
        if self.api.request_timeout_secs == 0 {
            errors.push(ValidationError::Api(
                "Request timeout must be positive".to_string(),
            ));
        }

        for (stage, model) in [
            ("prompt", &self.models.prompt),
            ("image", &self.models.image),
            ("video", &self.models.video),
        ] {
            if model.trim().is_empty() {
                errors.push(ValidationError::Model(
                    stage.to_string(),
                    "Model cannot be empty".to_string(),
                ));
            }
        }

        if self.video.number_of_videos == 0 {
            errors.push(ValidationError::Model(
                "video".to_string(),
                "number_of_videos must be at least 1".to_string(),
            ));
        }

        if self.poll.interval_secs == 0 {
            errors.push(ValidationError::Poll(
                "Interval must be positive".to_string(),
            ));
        }
        if self.poll.max_attempts == Some(0) {
            errors.push(ValidationError::Poll(
                "max_attempts must be positive when set".to_string(),
            ));
        }

        if self.status.interval_secs == 0 {
            errors.push(ValidationError::Status(
                "Interval must be positive".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

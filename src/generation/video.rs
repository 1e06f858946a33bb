//! Video renderer
//!
//! Submits a long-running video job, polls the operation handle at a fixed interval until it
//! reports done, downloads the generated asset and hands it to the asset store. The sleeper
//! is injected so the poll cadence can be driven deterministically.

use crate::assets::AssetStore;
use crate::config::{PollConfig, VideoSettings};
use crate::error::StudioError;
use crate::provider::{GenaiBackend, VideoOperation, VideoRequest};
use crate::types::MediaKind;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const NO_VIDEO_MESSAGE: &str = "Cinematic video generation failed.";
pub const DOWNLOAD_FAILURE_MESSAGE: &str = "Failed to download generated video asset.";

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How often to poll and how many waits to allow. `max_attempts = None` never gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
        }
    }
}

pub struct VideoRenderer {
    backend: Arc<dyn GenaiBackend>,
    assets: Arc<dyn AssetStore>,
    model: String,
    settings: VideoSettings,
    poll: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl VideoRenderer {
    pub fn new(
        backend: Arc<dyn GenaiBackend>,
        assets: Arc<dyn AssetStore>,
        model: String,
        settings: VideoSettings,
        poll: PollPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            backend,
            assets,
            model,
            settings,
            poll,
            sleeper,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, StudioError> {
        let started = Instant::now();
        let request = VideoRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            aspect_ratio: self.settings.aspect_ratio.clone(),
            resolution: self.settings.resolution.clone(),
            number_of_videos: self.settings.number_of_videos,
        };

        let operation = self.backend.submit_video(request).await?;
        info!(operation = %operation.name, model = %self.model, "Video job started");

        let operation = self.wait_for_completion(operation).await?;
        if let Some(error) = operation.error {
            return Err(StudioError::VideoGeneration(error));
        }
        let uri = operation
            .video_uri
            .ok_or_else(|| StudioError::VideoGeneration(NO_VIDEO_MESSAGE.to_string()))?;

        let asset = self.backend.download(&uri).await.map_err(|e| {
            warn!(error = %e, "Video download failed");
            if e.is_credential_failure() {
                e
            } else {
                StudioError::VideoDownload(DOWNLOAD_FAILURE_MESSAGE.to_string())
            }
        })?;

        let url = self.assets.store(MediaKind::Video, asset).await?;
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            "Video generated"
        );
        Ok(url)
    }

    async fn wait_for_completion(
        &self,
        mut operation: VideoOperation,
    ) -> Result<VideoOperation, StudioError> {
        let mut waits: u32 = 0;
        while !operation.done {
            if let Some(max) = self.poll.max_attempts {
                if waits >= max {
                    return Err(StudioError::VideoGeneration(format!(
                        "Video generation timed out after {} polls",
                        waits
                    )));
                }
            }
            self.sleeper.sleep(self.poll.interval).await;
            waits += 1;
            debug!(attempt = waits, operation = %operation.name, "Polling video job");
            operation = self.backend.refresh_video(&operation).await?;
        }
        Ok(operation)
    }
}

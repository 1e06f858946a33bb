//! Generation stages: the three contracts the studio orchestrates.
//!
//! `GenerationService` is the seam the orchestrator depends on. `StudioPipeline` implements
//! it on top of a `GenaiBackend` with one component per stage.

use crate::assets::AssetStore;
use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::provider::GenaiBackend;
use crate::types::GeneratedPrompts;
use async_trait::async_trait;
use std::sync::Arc;

pub mod image;
pub mod prompts;
pub mod video;

pub use image::ImageRenderer;
pub use prompts::PromptGenerator;
pub use video::{PollPolicy, Sleeper, TokioSleeper, VideoRenderer};

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Engineer the image/video prompt pair for a product.
    async fn generate_prompts(
        &self,
        name: &str,
        description: &str,
    ) -> Result<GeneratedPrompts, StudioError>;

    /// Render the image prompt; returns a data URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, StudioError>;

    /// Render the video prompt; returns a playable URL.
    async fn generate_video(&self, prompt: &str) -> Result<String, StudioError>;
}

/// Backend-driven implementation of all three stages.
pub struct StudioPipeline {
    prompts: PromptGenerator,
    image: ImageRenderer,
    video: VideoRenderer,
}

impl StudioPipeline {
    pub fn new(
        backend: Arc<dyn GenaiBackend>,
        assets: Arc<dyn AssetStore>,
        config: &StudioConfig,
    ) -> Self {
        Self::with_sleeper(backend, assets, config, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        backend: Arc<dyn GenaiBackend>,
        assets: Arc<dyn AssetStore>,
        config: &StudioConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            prompts: PromptGenerator::new(Arc::clone(&backend), config.models.prompt.clone()),
            image: ImageRenderer::new(
                Arc::clone(&backend),
                config.models.image.clone(),
                config.image.clone(),
            ),
            video: VideoRenderer::new(
                backend,
                assets,
                config.models.video.clone(),
                config.video.clone(),
                PollPolicy::from(&config.poll),
                sleeper,
            ),
        }
    }
}

#[async_trait]
impl GenerationService for StudioPipeline {
    async fn generate_prompts(
        &self,
        name: &str,
        description: &str,
    ) -> Result<GeneratedPrompts, StudioError> {
        self.prompts.generate(name, description).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, StudioError> {
        self.image.generate(prompt).await
    }

    async fn generate_video(&self, prompt: &str) -> Result<String, StudioError> {
        self.video.generate(prompt).await
    }
}

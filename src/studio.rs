//! Studio: the orchestration state machine
//!
//! Sequences one cycle from product submission through prompt engineering to concurrent
//! image/video rendering. The observable record lives behind a `watch` channel. Every
//! transition check and the state change it guards run inside one `send_if_modified`
//! critical section.

use crate::assets::DirectoryAssetStore;
use crate::config::StudioConfig;
use crate::credentials::CredentialProvider;
use crate::error::StudioError;
use crate::generation::{GenerationService, StudioPipeline};
use crate::provider::GeminiClient;
use crate::types::{GeneratedPrompts, LifecycleState, MediaResult, ProductDetails};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod ticker;

pub use ticker::{phrase_at, INITIAL_VIDEO_STATUS, VIDEO_FAILURE_STATUS, VIDEO_STATUS_PHRASES};

/// Top-level error shown when the backend rejects or cannot find the credential.
pub const CREDENTIAL_REMEDIATION: &str = "API Key configuration error. Please re-select your key.";

/// Everything an observer can see about the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudioSnapshot {
    pub product: ProductDetails,
    pub prompts: Option<GeneratedPrompts>,
    pub media: MediaResult,
    pub state: LifecycleState,
    pub error: Option<String>,
    pub video_status: Option<String>,
}

impl StudioSnapshot {
    pub fn inputs_editable(&self) -> bool {
        self.state.accepts_input()
    }
}

pub struct Studio {
    service: Arc<dyn GenerationService>,
    credentials: Arc<dyn CredentialProvider>,
    status_interval: Duration,
    state: watch::Sender<StudioSnapshot>,
}

impl Studio {
    pub fn new(
        service: Arc<dyn GenerationService>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let (state, _) = watch::channel(StudioSnapshot::default());
        Self {
            service,
            credentials,
            status_interval: crate::config::StatusConfig::default().interval(),
            state,
        }
    }

    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Wire the Gemini backend and a directory asset store from configuration.
    pub fn from_config(
        config: &StudioConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, StudioError> {
        let backend = Arc::new(GeminiClient::new(&config.api, Arc::clone(&credentials))?);
        let assets = Arc::new(DirectoryAssetStore::new(config.output.dir.clone()));
        let pipeline = StudioPipeline::new(backend, assets, config);
        Ok(Self::new(Arc::new(pipeline), credentials).with_status_interval(config.status.interval()))
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StudioSnapshot> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        self.state.borrow().state
    }

    pub fn inputs_editable(&self) -> bool {
        self.state.borrow().inputs_editable()
    }

    /// Engineer prompts for a product. Allowed from `Idle` and `Error`.
    pub async fn submit(&self, product: ProductDetails) -> Result<GeneratedPrompts, StudioError> {
        let mut admitted = Ok(());
        self.state.send_if_modified(|snap| {
            if !snap.state.accepts_input() {
                admitted = Err(StudioError::InvalidTransition {
                    from: snap.state,
                    action: "submit",
                });
                return false;
            }
            if let Err(e) = product.validate() {
                admitted = Err(e);
                return false;
            }
            *snap = StudioSnapshot {
                product: product.clone(),
                state: LifecycleState::GeneratingPrompts,
                ..StudioSnapshot::default()
            };
            true
        });
        admitted?;
        info!(state = %LifecycleState::GeneratingPrompts, product = %product.name, "Cycle started");

        match self
            .service
            .generate_prompts(&product.name, &product.description)
            .await
        {
            Ok(prompts) => {
                self.state.send_modify(|snap| {
                    snap.prompts = Some(prompts.clone());
                    snap.state = LifecycleState::PromptsReady;
                });
                info!(state = %LifecycleState::PromptsReady, "Prompts ready");
                Ok(prompts)
            }
            Err(e) => {
                warn!(state = %LifecycleState::Error, error = %e, "Prompt generation failed");
                self.state.send_modify(|snap| {
                    snap.error = Some(e.to_string());
                    snap.state = LifecycleState::Error;
                });
                Err(e)
            }
        }
    }

    /// Render both media from the ready prompts. Allowed from `PromptsReady` only.
    ///
    /// Renderer failures are contained: the cycle always reaches `Completed` and the returned
    /// result holds whatever succeeded.
    pub async fn render(&self) -> Result<MediaResult, StudioError> {
        self.ensure_state(LifecycleState::PromptsReady, "render")?;

        if !self.credentials.has_credential().await {
            info!("No credential configured, requesting selection");
            if let Err(e) = self.credentials.request_credential().await {
                warn!(error = %e, "Credential selection failed");
            }
        }

        let prompts = self.begin_render()?;
        info!(state = %LifecycleState::GeneratingMedia, "Rendering media");

        let image = async {
            match self.service.generate_image(&prompts.image_prompt).await {
                Ok(url) => {
                    debug!("Image ready");
                    self.state.send_modify(|snap| snap.media.image_url = Some(url));
                }
                Err(e) => warn!(error = %e, "Image generation failed"),
            }
        };

        let video = async {
            let outcome = ticker::with_status_ticker(
                self.service.generate_video(&prompts.video_prompt),
                self.status_interval,
                |phrase| {
                    self.state
                        .send_modify(|snap| snap.video_status = Some(phrase.to_string()));
                },
            )
            .await;
            match outcome {
                Ok(url) => {
                    debug!("Video ready");
                    self.state.send_modify(|snap| snap.media.video_url = Some(url));
                }
                Err(e) => self.record_video_failure(e).await,
            }
        };

        futures::join!(image, video);

        let mut media = MediaResult::default();
        self.state.send_modify(|snap| {
            snap.state = LifecycleState::Completed;
            media = snap.media.clone();
        });
        info!(
            state = %LifecycleState::Completed,
            image = media.image_url.is_some(),
            video = media.video_url.is_some(),
            "Cycle completed"
        );
        Ok(media)
    }

    /// Clear the cycle and return to `Idle`. Rejected while a stage is in flight.
    pub fn reset(&self) -> Result<(), StudioError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|snap| {
            if snap.state.is_busy() {
                outcome = Err(StudioError::InvalidTransition {
                    from: snap.state,
                    action: "reset",
                });
                return false;
            }
            if *snap == StudioSnapshot::default() {
                return false;
            }
            *snap = StudioSnapshot::default();
            true
        });
        if outcome.is_ok() {
            debug!(state = %LifecycleState::Idle, "Studio reset");
        }
        outcome
    }

    fn ensure_state(&self, expected: LifecycleState, action: &'static str) -> Result<(), StudioError> {
        let current = self.state();
        if current == expected {
            Ok(())
        } else {
            Err(StudioError::InvalidTransition {
                from: current,
                action,
            })
        }
    }

    /// Atomically move `PromptsReady -> GeneratingMedia` and hand back the prompts.
    fn begin_render(&self) -> Result<GeneratedPrompts, StudioError> {
        let mut claimed = Err(StudioError::InvalidTransition {
            from: LifecycleState::Idle,
            action: "render",
        });
        self.state.send_if_modified(|snap| {
            match (&snap.state, &snap.prompts) {
                (LifecycleState::PromptsReady, Some(prompts)) => {
                    claimed = Ok(prompts.clone());
                }
                _ => {
                    claimed = Err(StudioError::InvalidTransition {
                        from: snap.state,
                        action: "render",
                    });
                    return false;
                }
            }
            snap.state = LifecycleState::GeneratingMedia;
            snap.error = None;
            snap.media = MediaResult::default();
            snap.video_status = Some(INITIAL_VIDEO_STATUS.to_string());
            true
        });
        claimed
    }

    async fn record_video_failure(&self, error: StudioError) {
        let credential_failure = error.is_credential_failure();
        warn!(error = %error, credential_failure, "Video generation failed");

        self.state.send_modify(|snap| {
            if credential_failure {
                snap.error = Some(CREDENTIAL_REMEDIATION.to_string());
            }
            snap.video_status = Some(VIDEO_FAILURE_STATUS.to_string());
        });

        if credential_failure {
            if let Err(e) = self.credentials.request_credential().await {
                warn!(error = %e, "Credential re-selection failed");
            }
        }
    }
}

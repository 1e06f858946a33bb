//! Shared test utilities for integration tests
//!
//! Scripted generation service and backend doubles, a recording sleeper, and isolated
//! environment setup for config tests.

use async_trait::async_trait;
use reelsmith::error::StudioError;
use reelsmith::generation::{GenerationService, Sleeper};
use reelsmith::provider::{
    GenaiBackend, ImageRequest, TextRequest, VideoOperation, VideoRequest,
};
use reelsmith::types::{GeneratedPrompts, MediaAsset};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 5] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "REELSMITH_ENV",
    "REELSMITH__POLL__INTERVAL_SECS",
];

/// Run `f` with HOME and the XDG directories pointed into a fresh temp dir.
///
/// The previous environment is restored afterwards, even if `f` panics.
pub fn with_isolated_env<F, R>(f: F) -> R
where
    F: FnOnce(&TempDir) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ISOLATED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    let temp = TempDir::new().unwrap();
    std::env::set_var("HOME", temp.path());
    std::env::set_var("XDG_CONFIG_HOME", temp.path().join("config"));
    std::env::set_var("XDG_DATA_HOME", temp.path().join("data"));
    std::env::remove_var("REELSMITH_ENV");
    std::env::remove_var("REELSMITH__POLL__INTERVAL_SECS");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&temp)));

    for (name, value) in saved {
        match value {
            Some(v) => std::env::set_var(name, v),
            None => std::env::remove_var(name),
        }
    }

    match result {
        Ok(r) => r,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

pub fn sample_prompts() -> GeneratedPrompts {
    GeneratedPrompts {
        image_prompt: "Macro shot, 100mm lens, softbox lighting".to_string(),
        video_prompt: "Slow orbit, phantom-style slow motion".to_string(),
    }
}

/// Generation service with fixed per-stage results and optional gates that hold a stage
/// in flight until the test releases it.
pub struct MockService {
    prompts: Mutex<VecDeque<Result<GeneratedPrompts, StudioError>>>,
    image: Mutex<VecDeque<Result<String, StudioError>>>,
    video: Mutex<VecDeque<Result<String, StudioError>>>,
    video_delay: Option<Duration>,
    pub prompt_gate: Option<Semaphore>,
    pub prompt_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(VecDeque::new()),
            image: Mutex::new(VecDeque::new()),
            video: Mutex::new(VecDeque::new()),
            video_delay: None,
            prompt_gate: None,
            prompt_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_prompts(self, result: Result<GeneratedPrompts, StudioError>) -> Self {
        self.prompts.lock().unwrap().push_back(result);
        self
    }

    pub fn with_image(self, result: Result<String, StudioError>) -> Self {
        self.image.lock().unwrap().push_back(result);
        self
    }

    pub fn with_video(self, result: Result<String, StudioError>) -> Self {
        self.video.lock().unwrap().push_back(result);
        self
    }

    /// Video stage sleeps on the tokio clock before answering.
    pub fn with_video_delay(mut self, delay: Duration) -> Self {
        self.video_delay = Some(delay);
        self
    }

    /// Prompt stage blocks until `release_prompts` is called.
    pub fn gated(mut self) -> Self {
        self.prompt_gate = Some(Semaphore::new(0));
        self
    }

    pub fn release_prompts(&self) {
        if let Some(gate) = &self.prompt_gate {
            gate.add_permits(1);
        }
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, StudioError>>>) -> Result<T, StudioError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::ProviderError("nothing scripted".to_string())))
    }
}

#[async_trait]
impl GenerationService for MockService {
    async fn generate_prompts(
        &self,
        _name: &str,
        _description: &str,
    ) -> Result<GeneratedPrompts, StudioError> {
        self.prompt_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.prompt_gate {
            gate.acquire().await.unwrap().forget();
        }
        Self::next(&self.prompts)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, StudioError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.image)
    }

    async fn generate_video(&self, _prompt: &str) -> Result<String, StudioError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.video_delay {
            tokio::time::sleep(delay).await;
        }
        Self::next(&self.video)
    }
}

/// Backend double replaying scripted responses.
#[derive(Default)]
pub struct MockBackend {
    texts: Mutex<VecDeque<Result<String, StudioError>>>,
    images: Mutex<VecDeque<Result<Option<MediaAsset>, StudioError>>>,
    operations: Mutex<VecDeque<Result<VideoOperation, StudioError>>>,
    downloads: Mutex<VecDeque<Result<MediaAsset, StudioError>>>,
    pub image_requests: AtomicUsize,
    pub video_requests: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub downloaded: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: &str) {
        self.texts.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn push_image(&self, result: Result<Option<MediaAsset>, StudioError>) {
        self.images.lock().unwrap().push_back(result);
    }

    /// First pushed operation answers the submit; later ones answer refreshes in order.
    pub fn push_operation(&self, result: Result<VideoOperation, StudioError>) {
        self.operations.lock().unwrap().push_back(result);
    }

    pub fn push_download(&self, result: Result<MediaAsset, StudioError>) {
        self.downloads.lock().unwrap().push_back(result);
    }

    fn next_operation(&self) -> Result<VideoOperation, StudioError> {
        self.operations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::ProviderError("no operation".to_string())))
    }
}

#[async_trait]
impl GenaiBackend for MockBackend {
    async fn generate_text(&self, _request: TextRequest) -> Result<String, StudioError> {
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::ProviderError("no text".to_string())))
    }

    async fn generate_image(
        &self,
        _request: ImageRequest,
    ) -> Result<Option<MediaAsset>, StudioError> {
        self.image_requests.fetch_add(1, Ordering::SeqCst);
        self.images.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn submit_video(&self, _request: VideoRequest) -> Result<VideoOperation, StudioError> {
        self.video_requests.fetch_add(1, Ordering::SeqCst);
        self.next_operation()
    }

    async fn refresh_video(
        &self,
        _operation: &VideoOperation,
    ) -> Result<VideoOperation, StudioError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.next_operation()
    }

    async fn download(&self, uri: &str) -> Result<MediaAsset, StudioError> {
        self.downloaded.lock().unwrap().push(uri.to_string());
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(MediaAsset::new(vec![0, 0, 0, 24], "video/mp4")))
    }
}

/// Sleeper that returns immediately and records each requested wait.
#[derive(Default)]
pub struct RecordingSleeper {
    pub waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

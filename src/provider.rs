//! Generative Backend Abstraction
//!
//! Typed access to the three backend capabilities the studio needs: schema-constrained
//! text generation, inline image generation, and long-running video generation with a
//! downloadable result. `GenaiBackend` is the seam; `GeminiClient` speaks the
//! generative-language REST API over `reqwest`.

use crate::config::ApiConfig;
use crate::credentials::CredentialProvider;
use crate::error::StudioError;
use crate::types::MediaAsset;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub(crate) mod wire;

use wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
    OperationResponse, Part, PredictLongRunningRequest, VideoInstance, VideoParameters,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_VIDEO_MIME: &str = "video/mp4";
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Schema-constrained text generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub model: String,
    pub prompt: String,
    /// JSON schema the response must follow; `None` for free text.
    pub response_schema: Option<Value>,
}

/// Inline image generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: String,
    pub image_size: String,
}

/// Long-running video generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
    pub number_of_videos: u32,
}

/// Handle for a long-running video job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    /// Download reference, present once the job completed successfully.
    pub video_uri: Option<String>,
    /// Failure reported by the backend for a completed job.
    pub error: Option<String>,
}

impl VideoOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            video_uri: None,
            error: None,
        }
    }

    pub fn finished(name: impl Into<String>, video_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            video_uri: Some(video_uri.into()),
            error: None,
        }
    }
}

impl VideoOperation {
    pub(crate) fn from_wire(op: OperationResponse) -> Self {
        let video_uri = op.video_uri();
        let error = op.error.map(|status| match (status.code, status.message) {
            (Some(code), Some(message)) => format!("{} (code {})", message, code),
            (None, Some(message)) => message,
            (Some(code), None) => format!("operation failed with code {}", code),
            (None, None) => "operation failed".to_string(),
        });
        Self {
            name: op.name,
            done: op.done,
            video_uri,
            error,
        }
    }
}

#[async_trait]
pub trait GenaiBackend: Send + Sync {
    /// Generate text; returns the raw response text.
    async fn generate_text(&self, request: TextRequest) -> Result<String, StudioError>;

    /// Generate an image; `None` when the response carried no inline payload.
    async fn generate_image(&self, request: ImageRequest)
        -> Result<Option<MediaAsset>, StudioError>;

    /// Submit a video job and return its initial handle.
    async fn submit_video(&self, request: VideoRequest) -> Result<VideoOperation, StudioError>;

    /// Fetch the latest state of a video job.
    async fn refresh_video(&self, operation: &VideoOperation)
        -> Result<VideoOperation, StudioError>;

    /// Download a finished asset.
    async fn download(&self, uri: &str) -> Result<MediaAsset, StudioError>;
}

// Helper function to map HTTP errors to StudioError
fn map_http_error(error: reqwest::Error) -> StudioError {
    if let Some(status) = error.status() {
        map_status(status, error.to_string())
    } else if error.is_timeout() {
        StudioError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        StudioError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        StudioError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn map_status(status: StatusCode, message: String) -> StudioError {
    match status.as_u16() {
        401 | 403 => StudioError::ProviderAuthFailed(message),
        404 => StudioError::ProviderNotFound(message),
        429 => StudioError::ProviderRateLimit(message),
        _ => StudioError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, message
        )),
    }
}

async fn ensure_success(response: Response) -> Result<Response, StudioError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(map_status(status, wire::error_message(&body)))
}

fn build_http_client(api: &ApiConfig) -> Result<Client, StudioError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
        .timeout(Duration::from_secs(api.request_timeout_secs))
        .build()
        .map_err(|e| StudioError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// Generative-language REST client. The credential is read from the provider on every call.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    pub fn new(api: &ApiConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, StudioError> {
        Ok(Self {
            client: build_http_client(api)?,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn api_key(&self) -> Result<String, StudioError> {
        self.credentials.current().ok_or_else(|| {
            StudioError::CredentialUnavailable("No API key configured".to_string())
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:{}", self.base_url, model_path, method)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, StudioError> {
        Ok(builder.header(API_KEY_HEADER, self.api_key()?))
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, StudioError> {
        let url = self.model_url(model, "generateContent");
        let response = self
            .authorized(self.client.post(&url))?
            .json(request)
            .send()
            .await
            .map_err(map_http_error)?;
        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StudioError::ProviderError(format!("Failed to parse response: {}", e)))
    }
}

fn user_content(prompt: &str) -> Vec<Content> {
    vec![Content {
        role: Some("user".to_string()),
        parts: vec![Part::text(prompt)],
    }]
}

#[async_trait]
impl GenaiBackend for GeminiClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_text(&self, request: TextRequest) -> Result<String, StudioError> {
        let generation_config = request.response_schema.map(|schema| GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            image_config: None,
        });
        let body = GenerateContentRequest {
            contents: user_content(&request.prompt),
            generation_config,
        };
        let response = self.generate_content(&request.model, &body).await?;
        response
            .text()
            .ok_or_else(|| StudioError::ProviderError("No text in response".to_string()))
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<Option<MediaAsset>, StudioError> {
        let body = GenerateContentRequest {
            contents: user_content(&request.prompt),
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio,
                    image_size: request.image_size,
                }),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate_content(&request.model, &body).await?;
        let Some(inline) = response.inline_data() else {
            return Ok(None);
        };
        let bytes = BASE64.decode(inline.data.as_bytes()).map_err(|e| {
            StudioError::ImageGeneration(format!("Image payload is not valid base64: {}", e))
        })?;
        let mime = inline
            .mime_type
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
        Ok(Some(MediaAsset::new(bytes, mime)))
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn submit_video(&self, request: VideoRequest) -> Result<VideoOperation, StudioError> {
        let url = self.model_url(&request.model, "predictLongRunning");
        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt,
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio,
                resolution: request.resolution,
                sample_count: request.number_of_videos,
            },
        };
        let response = self
            .authorized(self.client.post(&url))?
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let operation: OperationResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                StudioError::ProviderError(format!("Failed to parse operation: {}", e))
            })?;
        debug!(operation = %operation.name, "Video job submitted");
        Ok(VideoOperation::from_wire(operation))
    }

    async fn refresh_video(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, StudioError> {
        let url = format!("{}/{}", self.base_url, operation.name.trim_start_matches('/'));
        let response = self
            .authorized(self.client.get(&url))?
            .send()
            .await
            .map_err(map_http_error)?;
        let refreshed: OperationResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                StudioError::ProviderError(format!("Failed to parse operation: {}", e))
            })?;
        Ok(VideoOperation::from_wire(refreshed))
    }

    async fn download(&self, uri: &str) -> Result<MediaAsset, StudioError> {
        let key = self.api_key()?;
        let response = self
            .client
            .get(uri)
            .query(&[("key", key.as_str())])
            .send()
            .await
            .map_err(map_http_error)?;
        let response = ensure_success(response).await?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| value.starts_with("video/"))
            .unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());
        let bytes = response.bytes().await.map_err(map_http_error)?;
        Ok(MediaAsset::new(bytes.to_vec(), mime))
    }
}

/// Backend that replays queued responses and records what it was asked.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedBackend {
    pub texts: parking_lot::Mutex<std::collections::VecDeque<Result<String, StudioError>>>,
    pub images: parking_lot::Mutex<std::collections::VecDeque<Result<Option<MediaAsset>, StudioError>>>,
    /// First entry answers `submit_video`, the rest answer successive refreshes.
    pub operations: parking_lot::Mutex<std::collections::VecDeque<Result<VideoOperation, StudioError>>>,
    pub downloads: parking_lot::Mutex<std::collections::VecDeque<Result<MediaAsset, StudioError>>>,
    pub text_requests: parking_lot::Mutex<Vec<TextRequest>>,
    pub image_requests: parking_lot::Mutex<Vec<ImageRequest>>,
    pub video_requests: parking_lot::Mutex<Vec<VideoRequest>>,
    pub refreshes: std::sync::atomic::AtomicUsize,
    pub downloaded: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, response: Result<String, StudioError>) {
        self.texts.lock().push_back(response);
    }

    pub fn push_image(&self, response: Result<Option<MediaAsset>, StudioError>) {
        self.images.lock().push_back(response);
    }

    pub fn push_operation(&self, response: Result<VideoOperation, StudioError>) {
        self.operations.lock().push_back(response);
    }

    pub fn push_download(&self, response: Result<MediaAsset, StudioError>) {
        self.downloads.lock().push_back(response);
    }

    fn next_operation(&self) -> Result<VideoOperation, StudioError> {
        self.operations
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::ProviderError("no scripted operation".to_string())))
    }
}

#[cfg(test)]
#[async_trait]
impl GenaiBackend for ScriptedBackend {
    async fn generate_text(&self, request: TextRequest) -> Result<String, StudioError> {
        self.text_requests.lock().push(request);
        self.texts
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::ProviderError("no scripted text".to_string())))
    }

    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<Option<MediaAsset>, StudioError> {
        self.image_requests.lock().push(request);
        self.images.lock().pop_front().unwrap_or(Ok(None))
    }

    async fn submit_video(&self, request: VideoRequest) -> Result<VideoOperation, StudioError> {
        self.video_requests.lock().push(request);
        self.next_operation()
    }

    async fn refresh_video(
        &self,
        _operation: &VideoOperation,
    ) -> Result<VideoOperation, StudioError> {
        self.refreshes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.next_operation()
    }

    async fn download(&self, uri: &str) -> Result<MediaAsset, StudioError> {
        self.downloaded.lock().push(uri.to_string());
        self.downloads
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(MediaAsset::new(vec![0, 1, 2], DEFAULT_VIDEO_MIME)))
    }
}

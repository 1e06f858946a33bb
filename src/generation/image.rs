//! Image renderer: one prompt in, one inline image out as a data URL.

use crate::config::ImageSettings;
use crate::error::StudioError;
use crate::provider::{GenaiBackend, ImageRequest};
use crate::types::MediaAsset;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use tracing::info;

pub const NO_IMAGE_MESSAGE: &str = "Professional image generation failed to return data.";

/// Encode an asset as a `data:` URL.
pub fn data_url(asset: &MediaAsset) -> String {
    format!(
        "data:{};base64,{}",
        asset.mime_type,
        BASE64.encode(&asset.bytes)
    )
}

/// Decode a `data:<mime>;base64,<payload>` URL back into an asset.
pub fn decode_data_url(url: &str) -> Option<MediaAsset> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = BASE64.decode(payload.as_bytes()).ok()?;
    Some(MediaAsset::new(bytes, mime))
}

pub struct ImageRenderer {
    backend: Arc<dyn GenaiBackend>,
    model: String,
    settings: ImageSettings,
}

impl ImageRenderer {
    pub fn new(backend: Arc<dyn GenaiBackend>, model: String, settings: ImageSettings) -> Self {
        Self {
            backend,
            model,
            settings,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, StudioError> {
        let request = ImageRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            aspect_ratio: self.settings.aspect_ratio.clone(),
            image_size: self.settings.image_size.clone(),
        };
        let asset = self
            .backend
            .generate_image(request)
            .await
            .map_err(|e| match e {
                StudioError::ImageGeneration(_) => e,
                other => StudioError::ImageGeneration(other.to_string()),
            })?
            .ok_or_else(|| StudioError::ImageGeneration(NO_IMAGE_MESSAGE.to_string()))?;

        info!(model = %self.model, bytes = asset.bytes.len(), "Image generated");
        Ok(data_url(&asset))
    }
}

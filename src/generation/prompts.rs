//! Prompt generator: turns product identity into a matched image/video prompt pair.

use crate::error::StudioError;
use crate::provider::{GenaiBackend, TextRequest};
use crate::types::GeneratedPrompts;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// User-facing message when the backend output is not the expected two-field object.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse agent's output. Please try again.";

const IMAGE_RULES: &str = "\
    - Use professional studio photography terminology.
    - Specify 85mm or 100mm macro lenses, shallow depth of field, softbox lighting, and clean minimalist backgrounds.
    - No text, logos, or watermarks.
    - Focus on texture, material quality, and sleek aesthetics.";

const VIDEO_RULES: &str = "\
    - Cinematic product reveal style.
    - Specify camera movements: slow pan, gimbal tilt, or orbiting shots.
    - Mention high-speed phantom-style slow motion (120fps feel).
    - Focus on light reflections and dynamic angles.
    - No ads, captions, or voiceover descriptions.";

/// Instruction text sent to the text model.
pub fn build_instruction(name: &str, description: &str) -> String {
    format!(
        "You are an AI product media generation agent.
    Task: Generate ONE detailed text prompt for TEXT-TO-IMAGE generation and ONE detailed text prompt for TEXT-TO-VIDEO generation for the following product:

    Product: {name}
    Context: {description}

    Rules for Image Prompt:
{IMAGE_RULES}

    Rules for Video Prompt:
{VIDEO_RULES}"
    )
}

/// Structured-output schema: an object with two required string fields.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "imagePrompt": { "type": "STRING" },
            "videoPrompt": { "type": "STRING" }
        },
        "required": ["imagePrompt", "videoPrompt"]
    })
}

/// Parse backend output into a prompt pair. Missing, non-string or blank fields fail.
pub fn parse_prompts(text: &str) -> Result<GeneratedPrompts, StudioError> {
    let prompts: GeneratedPrompts = serde_json::from_str(text.trim()).map_err(|e| {
        debug!(error = %e, "Prompt payload rejected");
        StudioError::PromptGeneration(PARSE_FAILURE_MESSAGE.to_string())
    })?;
    if prompts.image_prompt.trim().is_empty() || prompts.video_prompt.trim().is_empty() {
        return Err(StudioError::PromptGeneration(
            PARSE_FAILURE_MESSAGE.to_string(),
        ));
    }
    Ok(prompts)
}

pub struct PromptGenerator {
    backend: Arc<dyn GenaiBackend>,
    model: String,
}

impl PromptGenerator {
    pub fn new(backend: Arc<dyn GenaiBackend>, model: String) -> Self {
        Self { backend, model }
    }

    pub async fn generate(
        &self,
        name: &str,
        description: &str,
    ) -> Result<GeneratedPrompts, StudioError> {
        let started = Instant::now();
        let request = TextRequest {
            model: self.model.clone(),
            prompt: build_instruction(name, description),
            response_schema: Some(response_schema()),
        };

        let text = self.backend.generate_text(request).await.map_err(|e| {
            warn!(error = %e, model = %self.model, "Prompt request failed");
            match e {
                StudioError::PromptGeneration(_) => e,
                other => StudioError::PromptGeneration(other.to_string()),
            }
        })?;

        let prompts = parse_prompts(&text)?;
        info!(
            model = %self.model,
            duration_ms = started.elapsed().as_millis() as u64,
            "Prompts generated"
        );
        Ok(prompts)
    }
}

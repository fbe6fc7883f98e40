//! `GenerationProvider` implementation over the hosted multimodal API.

use async_trait::async_trait;

use infravision_core::asset::ImagePayload;
use infravision_core::error::GenerationError;
use infravision_core::provider::{GenerationProvider, GenerationRequest};

use crate::prompt::augment_prompt;
use crate::wire::{extract_image, Content, GenerateContentRequest, GenerateContentResponse, Part};

/// Hosted-model endpoint configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.5-flash-image`.
    pub model: String,
    /// API base URL; overridable for testing.
    pub base_url: String,
}

impl GeminiConfig {
    /// Config for the public endpoint with the default image model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash-image".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Single-call multimodal generation backend.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Assemble the ordered part list: base image, style images (at
    /// most three), then the augmented prompt text.
    fn build_parts(request: &GenerationRequest) -> Vec<Part> {
        let mut parts = Vec::with_capacity(request.style_images.len() + 2);
        parts.push(Part::image(&request.base_image.payload));
        for style in request.style_images.iter().take(3) {
            parts.push(Part::image(&style.payload));
        }
        parts.push(Part::text(augment_prompt(
            &request.prompt,
            &request.params,
        )));
        parts
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ImagePayload, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: Self::build_parts(request),
            }],
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        tracing::info!(model = %self.config.model, "Calling multimodal backend");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::ConnectionUnavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::AuthorizationInvalid(format!(
                "{status}: {detail}"
            )));
        }
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::SubmissionRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("unparseable response: {e}")))?;

        extract_image(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infravision_core::asset::{AssetRole, ImageAsset};
    use infravision_core::params::GenerationParameters;

    fn request_with_styles(count: usize) -> GenerationRequest {
        let payload = ImagePayload::png(vec![1]);
        GenerationRequest {
            prompt: "桥".into(),
            base_image: ImageAsset::new(payload.clone(), AssetRole::Base),
            style_images: (0..count)
                .map(|_| ImageAsset::new(payload.clone(), AssetRole::Style))
                .collect(),
            params: GenerationParameters::default(),
            mask: None,
        }
    }

    #[test]
    fn parts_are_base_then_styles_then_text() {
        let parts = GeminiProvider::build_parts(&request_with_styles(2));
        assert_eq!(parts.len(), 4);
        assert!(parts[0].inline_data.is_some());
        assert!(parts[1].inline_data.is_some());
        assert!(parts[2].inline_data.is_some());
        assert!(parts[3].text.is_some());
    }

    #[test]
    fn style_images_are_capped_at_three() {
        let parts = GeminiProvider::build_parts(&request_with_styles(5));
        // base + 3 styles + text
        assert_eq!(parts.len(), 5);
    }
}

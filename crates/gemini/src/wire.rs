//! Wire types for the `generateContent` endpoint.
//!
//! Request: an ordered list of content parts, inline image parts first,
//! the text part last. Response: candidates whose parts are scanned for
//! the first inline image.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use infravision_core::asset::ImagePayload;
use infravision_core::error::GenerationError;

/// One content part of the request or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// An inline image part, base64-encoded.
    pub fn image(payload: &ImagePayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: payload.mime_type.clone(),
                data: payload.to_base64(),
            }),
        }
    }
}

/// Base64-encoded inline binary content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

/// A single turn of content.
#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One response candidate.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// Scan a response for the first inline image part.
///
/// A response whose parts are all text (or absent entirely) is a
/// [`GenerationError::ModelReturnedNoImage`] failure -- the model
/// described an image instead of producing one.
pub fn extract_image(response: &GenerateContentResponse) -> Result<ImagePayload, GenerationError> {
    let parts = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or_default();

    for part in parts {
        if let Some(inline) = &part.inline_data {
            let bytes = BASE64.decode(&inline.data).map_err(|e| {
                GenerationError::Transport(format!("undecodable inline image data: {e}"))
            })?;
            return Ok(ImagePayload {
                mime_type: inline.mime_type.clone(),
                bytes,
            });
        }
    }

    Err(GenerationError::ModelReturnedNoImage)
}

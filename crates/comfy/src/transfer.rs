//! Binary asset transfer to and from the engine.
//!
//! Uploads local image bytes into the engine's input directory
//! (`POST /upload/image`) and fetches stored artifacts back
//! (`GET /view`). Pure I/O; no workflow knowledge.

use serde::Deserialize;

use infravision_core::asset::ImagePayload;
use infravision_core::error::GenerationError;

/// Client for the engine's image storage endpoints.
pub struct AssetTransferClient {
    client: reqwest::Client,
    api_url: String,
}

/// Response of a successful `POST /upload/image`.
///
/// `name` is the backend-side handle referenced from workflow graphs.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub name: String,
    #[serde(default)]
    pub subfolder: String,
    #[serde(rename = "type", default)]
    pub storage_type: String,
}

impl AssetTransferClient {
    /// Create a transfer client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8188`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a transfer client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Upload image bytes to the engine's input directory.
    ///
    /// Sends a multipart form with the binary payload and an overwrite
    /// flag, and returns the backend-side handle.
    pub async fn upload_image(
        &self,
        filename: &str,
        payload: &ImagePayload,
    ) -> Result<UploadedImage, GenerationError> {
        let part = reqwest::multipart::Part::bytes(payload.bytes.clone())
            .file_name(filename.to_string())
            .mime_str(&payload.mime_type)
            .map_err(|e| GenerationError::UploadFailed(format!("invalid mime type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("overwrite", "true");

        let response = self
            .client
            .post(format!("{}/upload/image", self.api_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GenerationError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::UploadFailed(format!(
                "upload returned {status}: {body}"
            )));
        }

        let uploaded = response
            .json::<UploadedImage>()
            .await
            .map_err(|e| GenerationError::UploadFailed(format!("unparseable upload response: {e}")))?;

        tracing::debug!(name = %uploaded.name, "Image uploaded to engine");
        Ok(uploaded)
    }

    /// Fetch a stored artifact as a self-contained payload.
    ///
    /// The result carries the full bytes, so it stays valid after the
    /// engine or the event channel goes away.
    pub async fn fetch_artifact(
        &self,
        filename: &str,
        subfolder: &str,
        storage_type: &str,
    ) -> Result<ImagePayload, GenerationError> {
        let response = self
            .client
            .get(format!("{}/view", self.api_url))
            .query(&[
                ("filename", filename),
                ("subfolder", subfolder),
                ("type", storage_type),
            ])
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("artifact fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Transport(format!(
                "artifact fetch returned {status}"
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Transport(format!("artifact body unreadable: {e}")))?;

        Ok(ImagePayload {
            mime_type,
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_deserializes_the_engine_shape() {
        let json = r#"{"name":"base_17.png","subfolder":"","type":"input"}"#;
        let uploaded: UploadedImage = serde_json::from_str(json).unwrap();
        assert_eq!(uploaded.name, "base_17.png");
        assert_eq!(uploaded.storage_type, "input");
    }

    #[test]
    fn upload_response_tolerates_missing_optional_fields() {
        let uploaded: UploadedImage = serde_json::from_str(r#"{"name":"x.png"}"#).unwrap();
        assert_eq!(uploaded.name, "x.png");
        assert_eq!(uploaded.subfolder, "");
    }
}

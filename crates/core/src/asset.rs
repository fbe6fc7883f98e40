//! Image assets and their encoded payloads.
//!
//! An [`ImageAsset`] is immutable once created: uploads create base/style
//! assets, a successful generation creates a generated asset. Superseding
//! an image means minting a new asset with a new id, never editing in
//! place.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::types::AssetId;

/// The role an asset plays within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    /// Structural reference the generation must follow.
    Base,
    /// Stylistic reference image (up to three per request).
    Style,
    /// Output produced by a generation backend.
    Generated,
    /// Inpainting mask painted over the base image.
    Mask,
}

/// Self-contained encoded image content.
///
/// Always carries the full bytes rather than a transient reference, so a
/// payload stays valid after the backend or channel that produced it is
/// gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw encoded image bytes.
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Create a PNG payload from raw bytes.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            bytes,
        }
    }

    /// Render as a `data:` URL for embedding in a presentation layer.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }

    /// Base64 encoding of the raw bytes (inline-data wire format).
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// An immutable image owned by a project's asset table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: AssetId,
    pub payload: ImagePayload,
    pub role: AssetRole,
}

impl ImageAsset {
    /// Mint a new asset with a fresh id.
    pub fn new(payload: ImagePayload, role: AssetRole) -> Self {
        Self {
            id: AssetId::new_v4(),
            payload,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trips_mime_and_content() {
        let payload = ImagePayload::png(vec![0x89, 0x50, 0x4e, 0x47]);
        let url = payload.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(url, format!("data:image/png;base64,{}", payload.to_base64()));
    }

    #[test]
    fn new_assets_get_distinct_ids() {
        let a = ImageAsset::new(ImagePayload::png(vec![1]), AssetRole::Base);
        let b = ImageAsset::new(ImagePayload::png(vec![1]), AssetRole::Base);
        assert_ne!(a.id, b.id);
    }
}

//! The generation-backend capability.
//!
//! [`GenerationProvider`] is the single seam between the project store
//! and whichever backend produces images. Two implementations exist:
//! the graph-engine variant (workflow graph over WebSocket) and the
//! single-call multimodal variant. Which one a deployment uses is an
//! injection choice, not a runtime branch.

use async_trait::async_trait;

use crate::asset::{ImageAsset, ImagePayload};
use crate::error::GenerationError;
use crate::params::GenerationParameters;

/// Everything a backend needs to run one generation attempt.
///
/// Owns clones of the referenced assets so a request stays valid while
/// the store snapshot that produced it is replaced.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Structural reference. Callers must verify presence before
    /// constructing a request; providers assume it.
    pub base_image: ImageAsset,
    /// Stylistic references, at most three.
    pub style_images: Vec<ImageAsset>,
    pub params: GenerationParameters,
    /// Optional inpainting mask painted over the base image.
    pub mask: Option<ImagePayload>,
}

/// An asynchronous image-generation backend.
///
/// Implementations are stateless and re-entrant; the caller serializes
/// submissions. Inputs are never mutated, and every failure is a
/// structured [`GenerationError`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one generation attempt to completion.
    ///
    /// Resolves to a self-contained encoded payload that remains valid
    /// after the backend connection is gone.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<ImagePayload, GenerationError>;
}

//! Generation orchestration.
//!
//! [`GenerationService`] is the single entry point the presentation
//! layer calls to generate. It validates preconditions before touching
//! the store or the network, records the attempt optimistically, drives
//! the injected provider, and reconciles the outcome. Which backend it
//! drives is decided at construction, not per call.

use std::sync::Arc;

use infravision_core::asset::ImagePayload;
use infravision_core::error::GenerationError;
use infravision_core::params::GenerationParameters;
use infravision_core::provider::{GenerationProvider, GenerationRequest};
use infravision_core::types::{AssetId, VersionId};

use crate::error::StoreError;
use crate::store::ProjectStore;

/// One generation submission from the presentation layer.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub prompt: String,
    pub base_image_id: AssetId,
    /// Stylistic reference assets, at most three are used.
    pub style_image_ids: Vec<AssetId>,
    /// Optional inpainting mask.
    pub mask: Option<ImagePayload>,
    pub params: GenerationParameters,
}

/// Drives a generation provider against a project store.
pub struct GenerationService {
    store: Arc<ProjectStore>,
    provider: Arc<dyn GenerationProvider>,
}

impl GenerationService {
    /// Wire a store to a backend. The provider choice is configuration;
    /// nothing downstream branches on which variant it is.
    pub fn new(store: Arc<ProjectStore>, provider: Arc<dyn GenerationProvider>) -> Self {
        Self { store, provider }
    }

    /// The store this service mutates.
    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    /// Run one generation attempt to its terminal state.
    ///
    /// Resolves once the version minted for this attempt is completed
    /// or failed; the outcome itself is observed through the store.
    /// Errors returned here are the immediate rejections: a missing
    /// base image or a submission while another is in flight, both
    /// raised before any project mutation or I/O.
    pub async fn submit_generation(
        &self,
        submit: SubmitRequest,
    ) -> Result<VersionId, GenerationError> {
        let (version_id, request) = self.begin(submit)?;
        self.run(version_id, request).await;
        Ok(version_id)
    }

    /// Fire-and-forget variant: rejections surface synchronously, the
    /// provider runs on a spawned task, and progress is observed via
    /// store events.
    pub fn spawn_generation(
        self: &Arc<Self>,
        submit: SubmitRequest,
    ) -> Result<VersionId, GenerationError> {
        let (version_id, request) = self.begin(submit)?;
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.run(version_id, request).await;
        });
        Ok(version_id)
    }

    /// Synchronous half: validate, snapshot the referenced assets, and
    /// append the pending version.
    fn begin(
        &self,
        submit: SubmitRequest,
    ) -> Result<(VersionId, GenerationRequest), GenerationError> {
        let snapshot = self.store.snapshot();

        let base_image = snapshot
            .find_asset(submit.base_image_id)
            .cloned()
            .ok_or_else(|| {
                GenerationError::Precondition("no base image selected".to_string())
            })?;

        // Unknown style ids are dropped rather than failing the attempt.
        let style_images = submit
            .style_image_ids
            .iter()
            .filter_map(|id| snapshot.find_asset(*id).cloned())
            .take(3)
            .collect();

        let version_id = self
            .store
            .begin_generation(submit.base_image_id, submit.prompt.clone(), submit.params.clone())
            .map_err(|e| match e {
                StoreError::GenerationInFlight => GenerationError::Precondition(
                    "a generation is already in flight".to_string(),
                ),
                other => GenerationError::Precondition(other.to_string()),
            })?;

        let request = GenerationRequest {
            prompt: submit.prompt,
            base_image,
            style_images,
            params: submit.params,
            mask: submit.mask,
        };
        Ok((version_id, request))
    }

    /// Asynchronous half: drive the provider and reconcile the outcome.
    async fn run(&self, version_id: VersionId, request: GenerationRequest) {
        match self.provider.generate(&request).await {
            Ok(payload) => {
                if let Err(e) = self.store.complete_generation(version_id, payload) {
                    tracing::error!(version_id = %version_id, error = %e, "Completion lost");
                }
            }
            Err(error) => {
                // Authorization failures invalidate the whole session;
                // everything else stays local to this one version.
                if error.is_authorization() {
                    self.store.set_connected(false);
                }
                if let Err(e) = self.store.fail_generation(version_id, error.to_string()) {
                    tracing::error!(version_id = %version_id, error = %e, "Failure lost");
                }
            }
        }
    }
}

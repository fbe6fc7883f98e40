//! `GenerationProvider` implementation over the graph engine.
//!
//! Drives the full flow for one request: preflight probe, base-image
//! upload, workflow construction, job execution, artifact fetch.
//! Stateless and re-entrant; the store serializes submissions.

use async_trait::async_trait;

use infravision_core::asset::ImagePayload;
use infravision_core::error::GenerationError;
use infravision_core::provider::{GenerationProvider, GenerationRequest};

use crate::api::EngineApi;
use crate::config::EngineConfig;
use crate::job::run_job;
use crate::transfer::AssetTransferClient;
use crate::workflow::{build_workflow, resolve_seed};

/// Graph-engine generation backend.
pub struct ComfyProvider {
    config: EngineConfig,
    api: EngineApi,
    transfer: AssetTransferClient,
}

impl ComfyProvider {
    /// Create a provider against the given engine, sharing one HTTP
    /// connection pool between the API and transfer clients.
    pub fn new(config: EngineConfig) -> Self {
        let http = reqwest::Client::new();
        let api = EngineApi::with_client(http.clone(), config.api_url.clone());
        let transfer = AssetTransferClient::with_client(http, config.api_url.clone());
        Self {
            config,
            api,
            transfer,
        }
    }
}

#[async_trait]
impl GenerationProvider for ComfyProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ImagePayload, GenerationError> {
        // Fail fast: nothing is uploaded or submitted against an
        // unreachable engine.
        self.api.preflight().await?;

        let filename = format!("base_{}.png", request.base_image.id);
        let uploaded = self
            .transfer
            .upload_image(&filename, &request.base_image.payload)
            .await?;

        // Unlocked parameters get a fresh seed here, once per
        // submission; the builder itself is deterministic.
        let seed = resolve_seed(&request.params);
        let workflow = build_workflow(&request.prompt, &uploaded.name, &request.params, seed)?;

        tracing::info!(
            base_image = %uploaded.name,
            seed,
            aspect_ratio = ?request.params.aspect_ratio,
            "Running workflow",
        );

        run_job(&self.config, &self.api, &self.transfer, &workflow).await
    }
}

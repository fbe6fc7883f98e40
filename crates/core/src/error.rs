//! Failure taxonomy for generation attempts.
//!
//! Every failure a [`GenerationProvider`](crate::provider::GenerationProvider)
//! can surface is one of these variants. Callers attach the rendered
//! message to the failed version; they never see an unstructured error.

/// A structured generation failure.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The backend did not answer the preflight liveness probe.
    #[error("Generation backend unreachable: {0}")]
    ConnectionUnavailable(String),

    /// The image upload request failed or returned a non-2xx status.
    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    /// The backend refused the submitted workflow graph.
    #[error("Workflow submission rejected ({status}): {detail}")]
    SubmissionRejected {
        /// HTTP status code returned by the submission endpoint.
        status: u16,
        /// Raw response body, kept for the audit trail.
        detail: String,
    },

    /// The event channel failed after subscription was established.
    #[error("Event channel error: {0}")]
    Transport(String),

    /// The engine reported the job itself failed mid-execution.
    #[error("Generation failed on the engine: {0}")]
    ExecutionFailed(String),

    /// The single-call backend answered with text but no inline image.
    #[error("Model returned no image data")]
    ModelReturnedNoImage,

    /// Credential or permission failure from a hosted-model backend.
    #[error("Authorization failed: {0}")]
    AuthorizationInvalid(String),

    /// The caller violated a precondition; no I/O was attempted.
    #[error("Precondition violated: {0}")]
    Precondition(String),
}

impl GenerationError {
    /// Whether this failure should invalidate the session-level
    /// "connected" flag and force re-authentication.
    pub fn is_authorization(&self) -> bool {
        matches!(self, GenerationError::AuthorizationInvalid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authorization_failures_invalidate_session() {
        assert!(GenerationError::AuthorizationInvalid("403".into()).is_authorization());
        assert!(!GenerationError::ModelReturnedNoImage.is_authorization());
        assert!(!GenerationError::Transport("reset".into()).is_authorization());
        assert!(!GenerationError::Precondition("no base image".into()).is_authorization());
    }

    #[test]
    fn submission_rejection_renders_status_and_detail() {
        let err = GenerationError::SubmissionRejected {
            status: 400,
            detail: "invalid prompt".into(),
        };
        assert_eq!(
            err.to_string(),
            "Workflow submission rejected (400): invalid prompt"
        );
    }
}

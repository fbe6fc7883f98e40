//! Aggregate-level errors.

use infravision_core::types::{AssetId, VersionId};

/// Violations of the project aggregate's rules.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced asset does not exist in the asset table.
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// The referenced version does not exist in the history.
    #[error("Version not found: {0}")]
    VersionNotFound(VersionId),

    /// A terminal transition was attempted on a version that is not
    /// pending. Completed and failed versions are immutable.
    #[error("Version {0} is not pending")]
    VersionNotPending(VersionId),

    /// A generation is already in flight; submissions are serialized.
    #[error("A generation is already in flight")]
    GenerationInFlight,
}

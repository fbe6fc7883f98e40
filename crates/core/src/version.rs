//! Project versions: the unit of generation history.
//!
//! Each generation attempt, successful or not, is one immutable
//! append-only [`ProjectVersion`]. `parent_id` links a version to the
//! version that was active when it was submitted, forming a tree rather
//! than a chain, so browsing back and regenerating branches history.

use serde::{Deserialize, Serialize};

use crate::params::GenerationParameters;
use crate::types::{AssetId, Timestamp, VersionId};

/// Lifecycle of a generation attempt.
///
/// `Generating` is entered optimistically the instant a request begins;
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    Generating,
    Completed,
    Failed,
}

/// One generation attempt in a project's history.
///
/// Invariant: exactly one of `result_image_id`, `error_message`, or
/// status `Generating` holds at any time. Once terminal, only
/// `is_favorite` may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: VersionId,
    /// The version active at submission time, if any. Non-owning
    /// back-reference; nothing enumerates children.
    pub parent_id: Option<VersionId>,
    pub timestamp: Timestamp,
    /// The asset used as structural reference for this attempt.
    pub base_image_id: AssetId,
    pub prompt: String,
    /// Frozen copy of the parameters at submission time.
    pub params: GenerationParameters,
    pub status: GenerationStatus,
    /// Set only on `Completed`.
    pub result_image_id: Option<AssetId>,
    /// Set only on `Failed`.
    pub error_message: Option<String>,
    /// User flag; the only field mutable after a terminal transition.
    pub is_favorite: bool,
}

impl ProjectVersion {
    /// Create a pending version with a fresh id, timestamped now.
    pub fn pending(
        parent_id: Option<VersionId>,
        base_image_id: AssetId,
        prompt: String,
        params: GenerationParameters,
    ) -> Self {
        Self {
            id: VersionId::new_v4(),
            parent_id,
            timestamp: chrono::Utc::now(),
            base_image_id,
            prompt,
            params,
            status: GenerationStatus::Generating,
            result_image_id: None,
            error_message: None,
            is_favorite: false,
        }
    }

    /// Whether this version is still awaiting a provider outcome.
    pub fn is_pending(&self) -> bool {
        self.status == GenerationStatus::Generating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_versions_start_generating_with_no_outcome() {
        let base = AssetId::new_v4();
        let v = ProjectVersion::pending(None, base, "桥".into(), Default::default());
        assert!(v.is_pending());
        assert!(v.result_image_id.is_none());
        assert!(v.error_message.is_none());
        assert!(!v.is_favorite);
        assert_eq!(v.base_image_id, base);
        assert!(v.parent_id.is_none());
    }

    #[test]
    fn pending_records_the_active_parent() {
        let parent = VersionId::new_v4();
        let v = ProjectVersion::pending(
            Some(parent),
            AssetId::new_v4(),
            "road".into(),
            Default::default(),
        );
        assert_eq!(v.parent_id, Some(parent));
    }
}

//! The project aggregate: versions, assets, and the active-view pointer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::asset::ImageAsset;
use crate::types::{AssetId, Timestamp, VersionId};
use crate::version::ProjectVersion;

/// Aggregate root owning all versions and assets of one project.
///
/// `versions` is insertion-ordered, newest first. `active_version_id` is
/// freely reassignable (history browsing) and is repointed to the newest
/// version at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: uuid::Uuid,
    pub name: String,
    pub updated_at: Timestamp,
    pub versions: Vec<ProjectVersion>,
    pub active_version_id: Option<VersionId>,
    pub assets: HashMap<AssetId, ImageAsset>,
}

impl Project {
    /// Create an empty project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            updated_at: chrono::Utc::now(),
            versions: Vec::new(),
            active_version_id: None,
            assets: HashMap::new(),
        }
    }

    /// The version currently selected for display, if any.
    pub fn active_version(&self) -> Option<&ProjectVersion> {
        let id = self.active_version_id?;
        self.find_version(id)
    }

    /// Look up a version by id.
    pub fn find_version(&self, id: VersionId) -> Option<&ProjectVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Look up an asset by id.
    pub fn find_asset(&self, id: AssetId) -> Option<&ImageAsset> {
        self.assets.get(&id)
    }

    /// The generated asset attached to the active version, if it has one.
    pub fn result_asset(&self) -> Option<&ImageAsset> {
        let version = self.active_version()?;
        let result_id = version.result_image_id?;
        self.find_asset(result_id)
    }
}

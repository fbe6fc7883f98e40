//! The project store: version history, asset table, active pointer.
//!
//! Every transition clones the current aggregate, applies the change,
//! and swaps the `Arc` in one write -- readers always observe a
//! complete snapshot, never a half-applied mutation. The store also
//! tracks the single in-flight generation and the session-level
//! connected flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::broadcast;

use infravision_core::asset::{AssetRole, ImageAsset, ImagePayload};
use infravision_core::params::GenerationParameters;
use infravision_core::project::Project;
use infravision_core::types::{AssetId, VersionId};
use infravision_core::version::{GenerationStatus, ProjectVersion};

use crate::error::StoreError;
use crate::events::StoreEvent;

/// Broadcast channel capacity for store events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns one project aggregate and serializes all mutations to it.
pub struct ProjectStore {
    project: RwLock<Arc<Project>>,
    event_tx: broadcast::Sender<StoreEvent>,
    /// The pending version currently being generated, if any.
    in_flight: Mutex<Option<VersionId>>,
    /// Session-level backend authorization flag.
    connected: AtomicBool,
}

impl ProjectStore {
    /// Create a store around a fresh project.
    pub fn new(project_name: impl Into<String>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            project: RwLock::new(Arc::new(Project::new(project_name))),
            event_tx,
            in_flight: Mutex::new(None),
            connected: AtomicBool::new(true),
        }
    }

    /// Subscribe to store change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Current aggregate snapshot. Cheap to call; the snapshot stays
    /// consistent while later transitions swap in new ones.
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.project.read().expect("project lock poisoned"))
    }

    /// The version currently selected for display, if any.
    pub fn active_version(&self) -> Option<ProjectVersion> {
        self.snapshot().active_version().cloned()
    }

    /// The generated asset attached to the active version, if any.
    pub fn result_asset(&self) -> Option<ImageAsset> {
        self.snapshot().result_asset().cloned()
    }

    /// Whether the session still holds valid backend authorization.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Flip the session authorization flag.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
        if !connected {
            let _ = self.event_tx.send(StoreEvent::SessionDisconnected);
        }
    }

    /// The version id of the generation currently in flight, if any.
    pub fn in_flight_version(&self) -> Option<VersionId> {
        *self.in_flight.lock().expect("in-flight lock poisoned")
    }

    // -----------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------

    /// Add an image to the asset table.
    pub fn import_asset(&self, payload: ImagePayload, role: AssetRole) -> AssetId {
        let asset = ImageAsset::new(payload, role);
        let asset_id = asset.id;
        self.commit(|project| {
            project.assets.insert(asset_id, asset);
        });
        let _ = self.event_tx.send(StoreEvent::AssetImported { asset_id });
        asset_id
    }

    /// Append a pending version and make it active, optimistically,
    /// before any network interaction happens.
    ///
    /// The new version's parent is whatever version was active at
    /// submission time. Rejects a second submission while one is in
    /// flight.
    pub fn begin_generation(
        &self,
        base_image_id: AssetId,
        prompt: impl Into<String>,
        params: GenerationParameters,
    ) -> Result<VersionId, StoreError> {
        let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
        if in_flight.is_some() {
            return Err(StoreError::GenerationInFlight);
        }

        if self.snapshot().find_asset(base_image_id).is_none() {
            return Err(StoreError::AssetNotFound(base_image_id));
        }

        let parent_id = self.snapshot().active_version_id;
        let version =
            ProjectVersion::pending(parent_id, base_image_id, prompt.into(), params);
        let version_id = version.id;

        self.commit(|project| {
            project.versions.insert(0, version);
            project.active_version_id = Some(version_id);
        });
        *in_flight = Some(version_id);
        drop(in_flight);

        tracing::info!(version_id = %version_id, parent_id = ?parent_id, "Generation started");
        let _ = self
            .event_tx
            .send(StoreEvent::GenerationStarted { version_id });
        Ok(version_id)
    }

    /// Transition a pending version to completed, attaching a newly
    /// minted generated asset. The active pointer is left alone; it
    /// already points at this version unless the user navigated away.
    pub fn complete_generation(
        &self,
        version_id: VersionId,
        payload: ImagePayload,
    ) -> Result<AssetId, StoreError> {
        self.ensure_pending(version_id)?;

        let asset = ImageAsset::new(payload, AssetRole::Generated);
        let asset_id = asset.id;

        self.commit(|project| {
            project.assets.insert(asset_id, asset);
            if let Some(version) = project.versions.iter_mut().find(|v| v.id == version_id) {
                version.status = GenerationStatus::Completed;
                version.result_image_id = Some(asset_id);
            }
        });
        self.clear_in_flight(version_id);

        tracing::info!(version_id = %version_id, asset_id = %asset_id, "Generation completed");
        let _ = self.event_tx.send(StoreEvent::GenerationCompleted {
            version_id,
            asset_id,
        });
        Ok(asset_id)
    }

    /// Transition a pending version to failed. The version stays in
    /// history as a durable record of the attempt.
    pub fn fail_generation(
        &self,
        version_id: VersionId,
        error: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_pending(version_id)?;
        let error = error.into();

        self.commit(|project| {
            if let Some(version) = project.versions.iter_mut().find(|v| v.id == version_id) {
                version.status = GenerationStatus::Failed;
                version.error_message = Some(error.clone());
            }
        });
        self.clear_in_flight(version_id);

        tracing::warn!(version_id = %version_id, error = %error, "Generation failed");
        let _ = self
            .event_tx
            .send(StoreEvent::GenerationFailed { version_id, error });
        Ok(())
    }

    /// Repoint the active version (history browsing).
    pub fn set_active_version(&self, version_id: VersionId) -> Result<(), StoreError> {
        if self.snapshot().find_version(version_id).is_none() {
            return Err(StoreError::VersionNotFound(version_id));
        }
        self.commit(|project| {
            project.active_version_id = Some(version_id);
        });
        let _ = self
            .event_tx
            .send(StoreEvent::ActiveVersionChanged { version_id });
        Ok(())
    }

    /// Toggle a version's favorite flag. Allowed in any status; this is
    /// the one mutable field of a terminal version.
    pub fn toggle_favorite(&self, version_id: VersionId) -> Result<bool, StoreError> {
        if self.snapshot().find_version(version_id).is_none() {
            return Err(StoreError::VersionNotFound(version_id));
        }
        let mut is_favorite = false;
        self.commit(|project| {
            if let Some(version) = project.versions.iter_mut().find(|v| v.id == version_id) {
                version.is_favorite = !version.is_favorite;
                is_favorite = version.is_favorite;
            }
        });
        let _ = self.event_tx.send(StoreEvent::FavoriteToggled {
            version_id,
            is_favorite,
        });
        Ok(is_favorite)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Apply a mutation to a clone of the aggregate and swap it in as
    /// one write. Readers never see intermediate state.
    fn commit(&self, mutate: impl FnOnce(&mut Project)) {
        let mut guard = self.project.write().expect("project lock poisoned");
        let mut next = (**guard).clone();
        mutate(&mut next);
        next.updated_at = chrono::Utc::now();
        *guard = Arc::new(next);
    }

    fn ensure_pending(&self, version_id: VersionId) -> Result<(), StoreError> {
        let snapshot = self.snapshot();
        let version = snapshot
            .find_version(version_id)
            .ok_or(StoreError::VersionNotFound(version_id))?;
        if !version.is_pending() {
            return Err(StoreError::VersionNotPending(version_id));
        }
        Ok(())
    }

    fn clear_in_flight(&self, version_id: VersionId) {
        let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
        if *in_flight == Some(version_id) {
            *in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn store_with_base() -> (ProjectStore, AssetId) {
        let store = ProjectStore::new("测试项目");
        let base = store.import_asset(ImagePayload::png(vec![1, 2]), AssetRole::Base);
        (store, base)
    }

    #[test]
    fn begin_appends_pending_version_and_repoints_active() {
        let (store, base) = store_with_base();
        let version_id = store
            .begin_generation(base, "桥", GenerationParameters::default())
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.versions.len(), 1);
        assert_eq!(snapshot.active_version_id, Some(version_id));
        assert!(snapshot.versions[0].is_pending());
        assert_eq!(store.in_flight_version(), Some(version_id));
    }

    #[test]
    fn begin_without_the_asset_mutates_nothing() {
        let store = ProjectStore::new("p");
        let missing = AssetId::new_v4();
        assert_matches!(
            store.begin_generation(missing, "桥", GenerationParameters::default()),
            Err(StoreError::AssetNotFound(_))
        );
        let snapshot = store.snapshot();
        assert!(snapshot.versions.is_empty());
        assert!(snapshot.active_version_id.is_none());
    }

    #[test]
    fn second_submission_is_rejected_while_one_is_pending() {
        let (store, base) = store_with_base();
        store
            .begin_generation(base, "a", GenerationParameters::default())
            .unwrap();
        assert_matches!(
            store.begin_generation(base, "b", GenerationParameters::default()),
            Err(StoreError::GenerationInFlight)
        );
        assert_eq!(store.snapshot().versions.len(), 1);
    }

    #[test]
    fn completion_attaches_a_generated_asset_and_clears_in_flight() {
        let (store, base) = store_with_base();
        let version_id = store
            .begin_generation(base, "桥", GenerationParameters::default())
            .unwrap();
        let asset_id = store
            .complete_generation(version_id, ImagePayload::png(vec![9]))
            .unwrap();

        let snapshot = store.snapshot();
        let version = snapshot.find_version(version_id).unwrap();
        assert_eq!(version.status, GenerationStatus::Completed);
        assert_eq!(version.result_image_id, Some(asset_id));
        assert!(version.error_message.is_none());
        assert_eq!(
            snapshot.find_asset(asset_id).unwrap().role,
            AssetRole::Generated
        );
        assert!(store.in_flight_version().is_none());
        // Active pointer untouched: it already points here.
        assert_eq!(snapshot.active_version_id, Some(version_id));
    }

    #[test]
    fn failure_records_the_error_and_keeps_the_version() {
        let (store, base) = store_with_base();
        let version_id = store
            .begin_generation(base, "桥", GenerationParameters::default())
            .unwrap();
        store
            .fail_generation(version_id, "event channel error: reset")
            .unwrap();

        let snapshot = store.snapshot();
        let version = snapshot.find_version(version_id).unwrap();
        assert_eq!(version.status, GenerationStatus::Failed);
        assert_eq!(
            version.error_message.as_deref(),
            Some("event channel error: reset")
        );
        assert!(version.result_image_id.is_none());
        assert!(store.in_flight_version().is_none());
    }

    #[test]
    fn terminal_versions_reject_further_transitions() {
        let (store, base) = store_with_base();
        let version_id = store
            .begin_generation(base, "桥", GenerationParameters::default())
            .unwrap();
        store
            .complete_generation(version_id, ImagePayload::png(vec![9]))
            .unwrap();

        assert_matches!(
            store.complete_generation(version_id, ImagePayload::png(vec![9])),
            Err(StoreError::VersionNotPending(_))
        );
        assert_matches!(
            store.fail_generation(version_id, "late error"),
            Err(StoreError::VersionNotPending(_))
        );
    }

    #[test]
    fn favorite_toggles_on_terminal_versions() {
        let (store, base) = store_with_base();
        let version_id = store
            .begin_generation(base, "桥", GenerationParameters::default())
            .unwrap();
        store
            .complete_generation(version_id, ImagePayload::png(vec![9]))
            .unwrap();

        assert!(store.toggle_favorite(version_id).unwrap());
        assert!(!store.toggle_favorite(version_id).unwrap());
    }

    #[test]
    fn browsing_history_then_generating_branches_the_tree() {
        let (store, base) = store_with_base();
        let first = store
            .begin_generation(base, "v1", GenerationParameters::default())
            .unwrap();
        store
            .complete_generation(first, ImagePayload::png(vec![1]))
            .unwrap();
        let second = store
            .begin_generation(base, "v2", GenerationParameters::default())
            .unwrap();
        store
            .complete_generation(second, ImagePayload::png(vec![2]))
            .unwrap();

        // Navigate back to the first version and regenerate from there.
        store.set_active_version(first).unwrap();
        let branched = store
            .begin_generation(base, "v3", GenerationParameters::default())
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.find_version(branched).unwrap().parent_id, Some(first));
        assert_eq!(snapshot.find_version(second).unwrap().parent_id, Some(first));
        // Newest first.
        assert_eq!(snapshot.versions[0].id, branched);
    }

    #[test]
    fn snapshots_are_immutable_under_later_transitions() {
        let (store, base) = store_with_base();
        let before = store.snapshot();
        store
            .begin_generation(base, "桥", GenerationParameters::default())
            .unwrap();
        assert!(before.versions.is_empty());
        assert_eq!(store.snapshot().versions.len(), 1);
    }

    #[test]
    fn disconnecting_broadcasts_a_session_event() {
        let store = ProjectStore::new("p");
        let mut rx = store.subscribe();
        store.set_connected(false);
        assert!(!store.is_connected());
        assert_matches!(rx.try_recv(), Ok(StoreEvent::SessionDisconnected));
    }
}

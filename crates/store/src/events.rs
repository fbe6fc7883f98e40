//! Store change notifications.
//!
//! Broadcast after each committed transition so a presentation layer
//! can re-render from the new snapshot. Receivers that lag past the
//! channel capacity miss events, not state: the snapshot is always
//! complete.

use infravision_core::types::{AssetId, VersionId};

/// A committed change to the project aggregate or the session.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// An asset was added to the asset table.
    AssetImported { asset_id: AssetId },

    /// A pending version was appended and made active.
    GenerationStarted { version_id: VersionId },

    /// A pending version completed with a generated asset.
    GenerationCompleted {
        version_id: VersionId,
        asset_id: AssetId,
    },

    /// A pending version failed.
    GenerationFailed {
        version_id: VersionId,
        error: String,
    },

    /// The user navigated history.
    ActiveVersionChanged { version_id: VersionId },

    /// A version's favorite flag changed.
    FavoriteToggled {
        version_id: VersionId,
        is_favorite: bool,
    },

    /// The session lost its backend authorization; the presentation
    /// layer should force re-authentication.
    SessionDisconnected,
}

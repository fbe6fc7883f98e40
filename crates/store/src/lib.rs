//! Project state ownership and generation orchestration.
//!
//! [`store::ProjectStore`] owns the version history and asset table,
//! applying every change as an atomic snapshot replace and broadcasting
//! [`events::StoreEvent`]s to subscribers. [`service::GenerationService`]
//! sits on top, driving an injected generation provider and reconciling
//! its outcome back into the store.

pub mod error;
pub mod events;
pub mod service;
pub mod store;

pub use error::StoreError;
pub use events::StoreEvent;
pub use service::{GenerationService, SubmitRequest};
pub use store::ProjectStore;

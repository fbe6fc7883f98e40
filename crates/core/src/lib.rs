//! Domain model for the municipal rendering workbench.
//!
//! Holds the asset/version/project aggregate, generation parameters,
//! the preset catalog, the error taxonomy shared by both generation
//! backends, and the [`GenerationProvider`](provider::GenerationProvider)
//! capability trait that unifies them.

pub mod asset;
pub mod error;
pub mod params;
pub mod preset;
pub mod project;
pub mod provider;
pub mod types;
pub mod version;

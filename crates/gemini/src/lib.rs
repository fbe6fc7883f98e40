//! Single-call multimodal generation backend.
//!
//! Packages the base image, style images, and an augmented prompt into
//! one `generateContent` round trip against a hosted multimodal model.
//! No graph, no streaming subscription: the response either carries an
//! inline image part or the attempt failed.

pub mod prompt;
pub mod provider;
pub mod wire;

pub use provider::{GeminiConfig, GeminiProvider};

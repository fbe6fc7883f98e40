//! Graph-engine generation backend (ComfyUI).
//!
//! Builds a request-specific workflow graph from a fixed template,
//! uploads the structural reference, submits the graph over HTTP,
//! tracks the job over a WebSocket event stream, and fetches the
//! finished artifact. [`provider::ComfyProvider`] packages the whole
//! flow behind the `GenerationProvider` capability.

pub mod api;
pub mod client;
pub mod config;
pub mod job;
pub mod messages;
pub mod provider;
pub mod transfer;
pub mod workflow;

//! Engine endpoint configuration.

/// Endpoints of one ComfyUI engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// HTTP base URL, e.g. `http://127.0.0.1:8188`.
    pub api_url: String,
    /// WebSocket base URL, e.g. `ws://127.0.0.1:8188`.
    pub ws_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8188".to_string(),
            ws_url: "ws://127.0.0.1:8188".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read endpoints from `COMFY_API_URL` / `COMFY_WS_URL`, falling
    /// back to the conventional local address for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("COMFY_API_URL").unwrap_or(defaults.api_url),
            ws_url: std::env::var("COMFY_WS_URL").unwrap_or(defaults.ws_url),
        }
    }
}

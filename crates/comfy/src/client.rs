//! WebSocket subscription to the engine's event stream.
//!
//! The event channel must be fully established before a graph is
//! submitted; the engine addresses completion messages to the
//! `clientId` carried in the handshake, and messages emitted before the
//! subscription exists are lost.

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use infravision_core::error::GenerationError;

use crate::config::EngineConfig;

/// A live event subscription for one generation session.
pub struct EngineSubscription {
    /// Session id sent during the handshake; the same id must accompany
    /// the graph submission.
    pub session_id: String,
    /// The raw WebSocket stream for reading frames.
    pub ws_stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

/// Open the event channel for a fresh session.
///
/// Generates a new session id (UUID v4), appends it as the `clientId`
/// query parameter, and resolves once the WebSocket handshake has
/// completed, i.e. once the engine is guaranteed to route events here.
pub async fn subscribe(config: &EngineConfig) -> Result<EngineSubscription, GenerationError> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let url = format!("{}/ws?clientId={}", config.ws_url, session_id);

    let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
        GenerationError::Transport(format!(
            "Failed to open event channel at {}: {e}",
            config.ws_url
        ))
    })?;

    tracing::info!(session_id = %session_id, "Event channel established");

    Ok(EngineSubscription {
        session_id,
        ws_stream,
    })
}

//! Job execution protocol.
//!
//! One generation job walks a fixed state machine:
//!
//! ```text
//! Idle -> Subscribing -> Submitted -> Running -> Done
//!                \----------\-----------\-----> Failed
//! ```
//!
//! The event channel is opened and fully established *before* the graph
//! is submitted; submitting first races the engine's completion
//! broadcast against the subscription and loses events. The channel is
//! closed exactly once on both outcomes. No timeout is imposed here --
//! generation duration is model-dependent, so a ceiling is the caller's
//! decision.

use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use infravision_core::asset::ImagePayload;
use infravision_core::error::GenerationError;

use crate::api::EngineApi;
use crate::client::subscribe;
use crate::config::EngineConfig;
use crate::messages::{parse_message, EngineMessage, OutputImage};
use crate::transfer::AssetTransferClient;

/// Protocol state of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Nothing has happened yet.
    Idle,
    /// Event channel established, graph not yet submitted.
    Subscribing,
    /// Graph accepted by the engine, no progress seen.
    Submitted,
    /// At least one progress-type event observed.
    Running,
    /// Completion event received and artifact descriptor captured.
    Done,
    /// Terminal failure.
    Failed,
}

/// Result of feeding one message into the state machine.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Stay in (or move to) the given phase and keep listening.
    Pending(JobPhase),
    /// The job finished; fetch this artifact.
    Finished(OutputImage),
    /// The engine reported the job failed.
    Failed(String),
}

/// Advance the protocol state machine by one inbound message.
///
/// Pure function over (phase, message); the socket loop applies it.
/// Progress and status events are informational, unknown types are
/// ignored, and only an `executed` message that actually carries image
/// descriptors completes the job (intermediate nodes also emit
/// `executed`, with no images).
pub fn advance(phase: JobPhase, message: &EngineMessage) -> Transition {
    match message {
        EngineMessage::Executed(data) => match data.output.images.first() {
            Some(image) => Transition::Finished(image.clone()),
            None => Transition::Pending(phase),
        },
        EngineMessage::ExecutionError(data) => {
            Transition::Failed(data.exception_message.clone())
        }
        EngineMessage::ExecutionStart(_) | EngineMessage::Progress(_) => {
            Transition::Pending(JobPhase::Running)
        }
        EngineMessage::Status(_) | EngineMessage::Unknown => Transition::Pending(phase),
    }
}

/// Run one workflow graph to completion.
///
/// Subscribes, submits, tracks events, and resolves to the finished
/// artifact as a self-contained payload. The returned payload does not
/// depend on the engine or the channel remaining reachable.
pub async fn run_job(
    config: &EngineConfig,
    api: &EngineApi,
    transfer: &AssetTransferClient,
    workflow: &serde_json::Value,
) -> Result<ImagePayload, GenerationError> {
    // Idle -> Subscribing. The subscription must be live before the
    // graph goes in.
    let mut subscription = subscribe(config).await?;
    let session_id = subscription.session_id.clone();

    // Subscribing -> Submitted, or straight to Failed.
    let submitted = match api.submit_workflow(workflow, &session_id).await {
        Ok(response) => response,
        Err(e) => {
            close_channel(&mut subscription.ws_stream).await;
            return Err(e);
        }
    };
    tracing::info!(
        session_id = %session_id,
        prompt_id = %submitted.prompt_id,
        "Workflow submitted",
    );

    let mut phase = JobPhase::Submitted;
    let outcome = loop {
        let frame = match subscription.ws_stream.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                break Err(GenerationError::Transport(format!(
                    "event channel error: {e}"
                )))
            }
            None => {
                break Err(GenerationError::Transport(
                    "event channel closed before completion".to_string(),
                ))
            }
        };

        match frame {
            Message::Text(text) => {
                let message = match parse_message(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!(error = %e, raw_message = %text, "Unparseable engine message");
                        continue;
                    }
                };
                match advance(phase, &message) {
                    Transition::Pending(next) => {
                        if next != phase {
                            tracing::debug!(?phase, next = ?next, "Job phase advanced");
                            phase = next;
                        }
                    }
                    Transition::Finished(image) => {
                        break transfer
                            .fetch_artifact(&image.filename, &image.subfolder, &image.storage_type)
                            .await;
                    }
                    Transition::Failed(detail) => {
                        break Err(GenerationError::ExecutionFailed(detail));
                    }
                }
            }
            Message::Binary(_) => {
                // Preview frames. Not part of the contract.
                tracing::trace!("Ignoring binary frame (preview image)");
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Handled automatically by tungstenite.
            }
            Message::Close(frame) => {
                break Err(GenerationError::Transport(format!(
                    "event channel closed by engine: {frame:?}"
                )));
            }
            Message::Frame(_) => {}
        }
    };

    // Closed on both outcomes; no leaked subscriptions.
    close_channel(&mut subscription.ws_stream).await;

    match &outcome {
        Ok(_) => tracing::info!(session_id = %session_id, "Job finished"),
        Err(e) => tracing::warn!(session_id = %session_id, error = %e, "Job failed"),
    }
    outcome
}

/// Close the event channel, tolerating an already-dead socket.
async fn close_channel(
    ws_stream: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) {
    if let Err(e) = ws_stream.close(None).await {
        tracing::debug!(error = %e, "Event channel close failed");
    }
}

//! Engine WebSocket message types and parser.
//!
//! The engine sends JSON envelopes of the shape
//! `{"type": "<kind>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`EngineMessage`] enum. Types this client does
//! not recognize map to [`EngineMessage::Unknown`] so new server-side
//! message kinds never break the protocol loop.

use serde::Deserialize;

/// All engine WebSocket message types this client reacts to.
///
/// Deserialized via the adjacently-tagged `"type"` field with
/// associated `"data"` content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineMessage {
    /// Server status broadcast (queue depth, etc.).
    #[serde(rename = "status")]
    Status(StatusData),

    /// A prompt has started executing.
    #[serde(rename = "execution_start")]
    ExecutionStart(ExecutionStartData),

    /// Progress update from a long-running node (e.g. the sampler).
    #[serde(rename = "progress")]
    Progress(ProgressData),

    /// A node has finished and produced output.
    #[serde(rename = "executed")]
    Executed(ExecutedData),

    /// Execution failed with an error.
    #[serde(rename = "execution_error")]
    ExecutionError(ErrorData),

    /// Any message type this client does not recognize. Ignored for
    /// forward compatibility.
    #[serde(other)]
    Unknown,
}

/// Queue status information.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusData {
    pub status: QueueStatus,
}

/// Current queue state.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueStatus {
    pub exec_info: ExecInfo,
}

/// Execution queue statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecInfo {
    pub queue_remaining: i32,
}

/// Payload for `execution_start` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStartData {
    pub prompt_id: String,
}

/// Payload for `progress` messages (step-level progress within a node).
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressData {
    /// Current step number.
    pub value: i32,
    /// Total number of steps.
    pub max: i32,
}

/// Payload for `executed` messages (node output).
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutedData {
    /// The node that produced this output.
    pub node: String,
    pub prompt_id: String,
    #[serde(default)]
    pub output: NodeOutput,
}

/// Output block of an `executed` message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeOutput {
    /// Saved artifacts, present when the finished node wrote images.
    #[serde(default)]
    pub images: Vec<OutputImage>,
}

/// Descriptor of one stored artifact, resolvable via `GET /view`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputImage {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    /// Storage type, e.g. `output` or `temp`.
    #[serde(rename = "type", default)]
    pub storage_type: String,
}

/// Payload for `execution_error` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorData {
    pub prompt_id: String,
    #[serde(default)]
    pub node_id: String,
    pub exception_message: String,
    #[serde(default)]
    pub exception_type: String,
}

/// Parse an engine WebSocket text message into a typed enum.
///
/// Returns `Err` only for malformed JSON; unknown `type` values map to
/// [`EngineMessage::Unknown`].
pub fn parse_message(text: &str) -> Result<EngineMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_message() {
        let json = r#"{"type":"status","data":{"status":{"exec_info":{"queue_remaining":3}}}}"#;
        let msg = parse_message(json).unwrap();
        match msg {
            EngineMessage::Status(data) => {
                assert_eq!(data.status.exec_info.queue_remaining, 3);
            }
            other => panic!("Expected Status, got {other:?}"),
        }
    }

    #[test]
    fn parse_execution_start_message() {
        let json = r#"{"type":"execution_start","data":{"prompt_id":"abc-123"}}"#;
        let msg = parse_message(json).unwrap();
        match msg {
            EngineMessage::ExecutionStart(data) => {
                assert_eq!(data.prompt_id, "abc-123");
            }
            other => panic!("Expected ExecutionStart, got {other:?}"),
        }
    }

    #[test]
    fn parse_progress_message() {
        let json = r#"{"type":"progress","data":{"value":5,"max":20}}"#;
        let msg = parse_message(json).unwrap();
        match msg {
            EngineMessage::Progress(data) => {
                assert_eq!(data.value, 5);
                assert_eq!(data.max, 20);
            }
            other => panic!("Expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn parse_executed_message_with_images() {
        let json = r#"{"type":"executed","data":{"node":"9","prompt_id":"abc",
            "output":{"images":[{"filename":"Infravision_00001_.png","subfolder":"","type":"output"}]}}}"#;
        let msg = parse_message(json).unwrap();
        match msg {
            EngineMessage::Executed(data) => {
                assert_eq!(data.node, "9");
                assert_eq!(data.output.images.len(), 1);
                let img = &data.output.images[0];
                assert_eq!(img.filename, "Infravision_00001_.png");
                assert_eq!(img.subfolder, "");
                assert_eq!(img.storage_type, "output");
            }
            other => panic!("Expected Executed, got {other:?}"),
        }
    }

    #[test]
    fn parse_executed_message_without_images() {
        let json = r#"{"type":"executed","data":{"node":"12","prompt_id":"abc","output":{}}}"#;
        let msg = parse_message(json).unwrap();
        match msg {
            EngineMessage::Executed(data) => assert!(data.output.images.is_empty()),
            other => panic!("Expected Executed, got {other:?}"),
        }
    }

    #[test]
    fn parse_execution_error_message() {
        let json = r#"{"type":"execution_error","data":{"prompt_id":"abc","node_id":"5",
            "exception_message":"out of memory","exception_type":"RuntimeError"}}"#;
        let msg = parse_message(json).unwrap();
        match msg {
            EngineMessage::ExecutionError(data) => {
                assert_eq!(data.prompt_id, "abc");
                assert_eq!(data.exception_message, "out of memory");
            }
            other => panic!("Expected ExecutionError, got {other:?}"),
        }
    }

    #[test]
    fn unknown_types_map_to_the_catch_all() {
        let json = r#"{"type":"execution_cached","data":{"prompt_id":"abc","nodes":["1"]}}"#;
        let msg = parse_message(json).unwrap();
        assert!(matches!(msg, EngineMessage::Unknown));
    }

    #[test]
    fn parse_invalid_json_returns_error() {
        assert!(parse_message("not json at all").is_err());
    }
}

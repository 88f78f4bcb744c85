//! Event classifier: turns a decoded frame into a typed `Event` (§3, §4.3).
//!
//! Dispatch is closed-enum / tagged-variant, matching the house style of
//! provider stream converters (`AnthropicStreamEvent` et al.): every payload
//! struct is `#[serde(default)]` on its optional fields so unknown or missing
//! keys never fail the parse (§9 "Lenient JSON").

use crate::wire::frame::Frame;
use crate::wire::header::index_by_name;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AssistantResponse {
        conversation_id: Option<String>,
        message_id: Option<String>,
        content: String,
        content_type: Option<String>,
        completed: bool,
    },
    ToolUse {
        name: Option<String>,
        tool_use_id: String,
        input: Option<Value>,
        stop: bool,
    },
    ContextUsage {
        context_usage_percentage: f64,
    },
    Metering,
    SessionStart,
    SessionEnd,
    ToolCallRequest,
    ToolCallError,
    Unknown {
        raw_type: String,
        raw_payload: Vec<u8>,
    },
    Error {
        code: String,
        message: String,
    },
    Exception {
        r#type: String,
        message: String,
    },
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AssistantResponsePayload {
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    message_status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ToolUsePayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tool_use_id: String,
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    stop: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ContextUsagePayload {
    #[serde(default)]
    context_usage_percentage: f64,
}

fn payload_as_utf8_or_default(payload: &[u8]) -> String {
    String::from_utf8(payload.to_vec()).unwrap_or_else(|_| "<binary payload>".to_string())
}

/// Classify a decoded frame into a typed event. Never fails: unrecognized or
/// malformed payloads demote to `Event::Unknown` rather than propagate an
/// error (§4.3, §7).
pub fn classify(frame: &Frame) -> Event {
    let index = index_by_name(&frame.headers);

    let message_type = index
        .get(":message-type")
        .and_then(|v| v.as_str())
        .unwrap_or("event");

    match message_type {
        "error" => {
            let code = index
                .get(":error-code")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| "UnknownError".to_string());
            let message = payload_as_utf8_or_default(&frame.payload);
            return Event::Error { code, message };
        }
        "exception" => {
            let r#type = index
                .get(":exception-type")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| "UnknownException".to_string());
            let message = payload_as_utf8_or_default(&frame.payload);
            return Event::Exception { r#type, message };
        }
        _ => {}
    }

    let event_type = index
        .get(":event-type")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let demote_to_unknown = || Event::Unknown {
        raw_type: event_type.clone(),
        raw_payload: frame.payload.clone(),
    };

    match event_type.as_str() {
        "assistantResponseEvent" => {
            match serde_json::from_slice::<AssistantResponsePayload>(&frame.payload) {
                Ok(p) => Event::AssistantResponse {
                    conversation_id: p.conversation_id,
                    message_id: p.message_id,
                    content: p.content,
                    content_type: p.content_type,
                    completed: p.message_status.as_deref() == Some("COMPLETED"),
                },
                Err(_) => demote_to_unknown(),
            }
        }
        "toolUseEvent" => match serde_json::from_slice::<ToolUsePayload>(&frame.payload) {
            Ok(p) => Event::ToolUse {
                name: p.name,
                tool_use_id: p.tool_use_id,
                input: p.input,
                stop: p.stop,
            },
            Err(_) => demote_to_unknown(),
        },
        "contextUsageEvent" => match serde_json::from_slice::<ContextUsagePayload>(&frame.payload)
        {
            Ok(p) => Event::ContextUsage {
                context_usage_percentage: p.context_usage_percentage,
            },
            Err(_) => demote_to_unknown(),
        },
        "meteringEvent" => Event::Metering,
        "sessionStartEvent" => Event::SessionStart,
        "sessionEndEvent" => Event::SessionEnd,
        "toolCallRequestEvent" => Event::ToolCallRequest,
        "toolCallErrorEvent" => Event::ToolCallError,
        _ => demote_to_unknown(),
    }
}

/// True if the well-known `:message-type` header marks this frame as an
/// event (as opposed to error/exception). Exposed for tests/debugging.
pub fn is_event_frame(frame: &Frame) -> bool {
    let index = index_by_name(&frame.headers);
    !matches!(
        index.get(":message-type").and_then(|v| v.as_str()),
        Some("error") | Some("exception")
    )
}

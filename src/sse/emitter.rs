//! Upstream events -> Anthropic SSE event sequence (§4.5).
//!
//! Per-request, stateful, not thread-safe — mirrors the contract the teacher
//! places on per-stream converters (`AnthropicEventConverter` holds
//! configuration and is cloned fresh per request; `server_adapters/axum.rs`'s
//! `to_sse_response` builds the outgoing `Event` the same
//! `.event(name).data(json)` way we do here, just without needing to track
//! open/close block state since its source stream already carries that).

use crate::convert::count_tokens;
use crate::wire::event::Event as UpstreamEvent;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event: &'static str,
    pub data: Value,
}

impl SseEvent {
    /// Serialize to the wire form: `event: <name>\ndata: <json>\n\n`.
    pub fn to_wire(&self) -> String {
        format!(
            "event: {}\ndata: {}\n\n",
            self.event,
            serde_json::to_string(&self.data).unwrap_or_else(|_| "{}".to_string())
        )
    }
}

fn input_is_empty(v: &Value) -> bool {
    match v {
        Value::String(s) => s.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

pub struct SseEmitter {
    message_start_sent: bool,
    block_index: usize,
    text_open: bool,
    tool_open: bool,
    input_tokens: u32,
    terminated: bool,
    model: String,
    upstream_model: &'static str,
    message_id: String,
}

impl SseEmitter {
    pub fn new(model: String, upstream_model: &'static str) -> Self {
        Self {
            message_start_sent: false,
            block_index: 0,
            text_open: false,
            tool_open: false,
            input_tokens: 0,
            terminated: false,
            model,
            upstream_model,
            message_id: format!("msg_{}", &uuid::Uuid::new_v4().simple().to_string()[..24]),
        }
    }

    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Translate one upstream event into zero or more Anthropic SSE events.
    pub fn handle(&mut self, event: &UpstreamEvent) -> Vec<SseEvent> {
        if self.terminated {
            return Vec::new();
        }

        let mut out = Vec::new();
        self.ensure_message_start(&mut out);

        match event {
            UpstreamEvent::ContextUsage {
                context_usage_percentage,
            } => {
                self.input_tokens = count_tokens::input_tokens_from_percentage(
                    self.upstream_model,
                    *context_usage_percentage,
                );
            }
            UpstreamEvent::AssistantResponse {
                content, completed, ..
            } => {
                if self.tool_open {
                    self.close_tool(&mut out);
                }
                if !content.is_empty() && !self.text_open {
                    self.open_text(&mut out);
                }
                if !content.is_empty() {
                    out.push(self.text_delta(content));
                }
                if *completed {
                    if self.text_open {
                        self.close_text(&mut out);
                    }
                    self.terminate(&mut out, "end_turn");
                }
            }
            UpstreamEvent::ToolUse {
                name,
                tool_use_id,
                input,
                stop,
            } => {
                if self.text_open {
                    self.close_text(&mut out);
                }
                if !self.tool_open {
                    self.open_tool(&mut out, tool_use_id.clone(), name.clone().unwrap_or_default());
                }
                if let Some(input) = input
                    && !input_is_empty(input)
                {
                    let fragment = match input {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    if !fragment.is_empty() {
                        out.push(self.input_json_delta(&fragment));
                    }
                }
                if *stop {
                    self.close_tool(&mut out);
                    self.terminate(&mut out, "tool_use");
                }
            }
            UpstreamEvent::SessionEnd => {
                self.terminate(&mut out, "end_turn");
            }
            UpstreamEvent::Error { code, message } => {
                out.push(self.error_event(&format!("{code}: {message}")));
                self.terminated = true;
            }
            UpstreamEvent::Exception { r#type, message } => {
                out.push(self.error_event(&format!("{type}: {message}")));
                self.terminated = true;
            }
            UpstreamEvent::Metering
            | UpstreamEvent::SessionStart
            | UpstreamEvent::ToolCallRequest
            | UpstreamEvent::ToolCallError
            | UpstreamEvent::Unknown { .. } => {}
        }

        out
    }

    /// If the stream ends without an explicit terminating event, degrade
    /// gracefully into an `end_turn` termination (§7 invariant).
    pub fn finish(&mut self) -> Vec<SseEvent> {
        if self.terminated {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.ensure_message_start(&mut out);
        self.terminate(&mut out, "end_turn");
        out
    }

    fn ensure_message_start(&mut self, out: &mut Vec<SseEvent>) {
        if self.message_start_sent {
            return;
        }
        self.message_start_sent = true;
        out.push(SseEvent {
            event: "message_start",
            data: json!({
                "type": "message_start",
                "message": {
                    "id": self.message_id,
                    "type": "message",
                    "role": "assistant",
                    "content": [],
                    "model": self.model,
                    "stop_reason": Value::Null,
                    "stop_sequence": Value::Null,
                    "usage": {"input_tokens": self.input_tokens, "output_tokens": 1},
                }
            }),
        });
    }

    fn open_text(&mut self, out: &mut Vec<SseEvent>) {
        out.push(SseEvent {
            event: "content_block_start",
            data: json!({
                "type": "content_block_start",
                "index": self.block_index,
                "content_block": {"type": "text", "text": ""},
            }),
        });
        self.text_open = true;
    }

    fn close_text(&mut self, out: &mut Vec<SseEvent>) {
        out.push(SseEvent {
            event: "content_block_stop",
            data: json!({"type": "content_block_stop", "index": self.block_index}),
        });
        self.text_open = false;
        self.block_index += 1;
    }

    fn text_delta(&self, text: &str) -> SseEvent {
        SseEvent {
            event: "content_block_delta",
            data: json!({
                "type": "content_block_delta",
                "index": self.block_index,
                "delta": {"type": "text_delta", "text": text},
            }),
        }
    }

    fn open_tool(&mut self, out: &mut Vec<SseEvent>, id: String, name: String) {
        out.push(SseEvent {
            event: "content_block_start",
            data: json!({
                "type": "content_block_start",
                "index": self.block_index,
                "content_block": {"type": "tool_use", "id": id, "name": name, "input": {}},
            }),
        });
        self.tool_open = true;
    }

    fn close_tool(&mut self, out: &mut Vec<SseEvent>) {
        out.push(SseEvent {
            event: "content_block_stop",
            data: json!({"type": "content_block_stop", "index": self.block_index}),
        });
        self.tool_open = false;
        self.block_index += 1;
    }

    fn input_json_delta(&self, fragment: &str) -> SseEvent {
        SseEvent {
            event: "content_block_delta",
            data: json!({
                "type": "content_block_delta",
                "index": self.block_index,
                "delta": {"type": "input_json_delta", "partial_json": fragment},
            }),
        }
    }

    fn terminate(&mut self, out: &mut Vec<SseEvent>, stop_reason: &str) {
        if self.tool_open {
            self.close_tool(out);
        }
        if self.text_open {
            self.close_text(out);
        }
        out.push(SseEvent {
            event: "message_delta",
            data: json!({
                "type": "message_delta",
                "delta": {"stop_reason": stop_reason, "stop_sequence": Value::Null},
                "usage": {"input_tokens": self.input_tokens, "output_tokens": 1},
            }),
        });
        out.push(SseEvent {
            event: "message_stop",
            data: json!({"type": "message_stop"}),
        });
        self.terminated = true;
    }

    fn error_event(&self, message: &str) -> SseEvent {
        SseEvent {
            event: "error",
            data: json!({
                "type": "error",
                "error": {"type": "api_error", "message": message},
            }),
        }
    }
}

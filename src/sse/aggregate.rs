//! Non-streaming aggregation: the same event sequence the emitter would
//! turn into SSE, folded into one `MessagesResponse` (§4.5 final paragraph).

use crate::convert::count_tokens;
use crate::model::anthropic::{MessagesResponse, ResponseContentBlock, Usage};
use crate::wire::event::Event as UpstreamEvent;
use serde_json::Value;

#[derive(Default)]
struct OpenTool {
    id: String,
    name: String,
    partial_json: String,
}

/// Folds a full event stream into a single response body, used when the
/// client did not request `stream: true`.
pub struct Aggregator {
    model: String,
    upstream_model: &'static str,
    text: String,
    blocks: Vec<ResponseContentBlock>,
    open_tool: Option<OpenTool>,
    input_tokens: u32,
    stop_reason: Option<&'static str>,
}

impl Aggregator {
    pub fn new(model: String, upstream_model: &'static str) -> Self {
        Self {
            model,
            upstream_model,
            text: String::new(),
            blocks: Vec::new(),
            open_tool: None,
            input_tokens: 0,
            stop_reason: None,
        }
    }

    pub fn handle(&mut self, event: &UpstreamEvent) {
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
                self.text.push_str(content);
                if *completed {
                    self.flush_text();
                    self.stop_reason.get_or_insert("end_turn");
                }
            }
            UpstreamEvent::ToolUse {
                name,
                tool_use_id,
                input,
                stop,
            } => {
                self.flush_text();
                let tool = self.open_tool.get_or_insert_with(|| OpenTool {
                    id: tool_use_id.clone(),
                    name: name.clone().unwrap_or_default(),
                    partial_json: String::new(),
                });
                if let Some(input) = input {
                    match input {
                        Value::String(s) => tool.partial_json.push_str(s),
                        other => tool.partial_json.push_str(&other.to_string()),
                    }
                }
                if *stop {
                    self.flush_tool();
                    self.stop_reason.get_or_insert("tool_use");
                }
            }
            UpstreamEvent::SessionEnd => {
                self.flush_text();
                self.flush_tool();
                self.stop_reason.get_or_insert("end_turn");
            }
            UpstreamEvent::Metering
            | UpstreamEvent::SessionStart
            | UpstreamEvent::ToolCallRequest
            | UpstreamEvent::ToolCallError
            | UpstreamEvent::Unknown { .. }
            | UpstreamEvent::Error { .. }
            | UpstreamEvent::Exception { .. } => {}
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.blocks.push(ResponseContentBlock::Text {
                text: std::mem::take(&mut self.text),
            });
        }
    }

    fn flush_tool(&mut self) {
        if let Some(tool) = self.open_tool.take() {
            let input = serde_json::from_str(&tool.partial_json).unwrap_or(Value::Object(Default::default()));
            self.blocks.push(ResponseContentBlock::ToolUse {
                id: tool.id,
                name: tool.name,
                input,
            });
        }
    }

    pub fn finish(mut self) -> MessagesResponse {
        self.flush_text();
        self.flush_tool();
        MessagesResponse {
            id: format!("msg_{}", &uuid::Uuid::new_v4().simple().to_string()[..24]),
            r#type: "message",
            role: "assistant",
            content: self.blocks,
            model: self.model,
            stop_reason: Some(self.stop_reason.unwrap_or("end_turn").to_string()),
            stop_sequence: None,
            usage: Usage {
                input_tokens: self.input_tokens,
                output_tokens: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_text_then_tool() {
        let mut agg = Aggregator::new("claude-sonnet-4-5".to_string(), "upstream-sonnet");
        agg.handle(&UpstreamEvent::AssistantResponse {
            conversation_id: None,
            message_id: None,
            content: "checking".to_string(),
            content_type: None,
            completed: false,
        });
        agg.handle(&UpstreamEvent::ToolUse {
            name: Some("search".to_string()),
            tool_use_id: "t1".to_string(),
            input: Some(Value::String("{\"q\":1}".to_string())),
            stop: true,
        });
        let response = agg.finish();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        match &response.content[1] {
            ResponseContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "search");
                assert_eq!(input["q"], 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn defaults_to_end_turn_when_unterminated() {
        let mut agg = Aggregator::new("m".to_string(), "upstream-sonnet");
        agg.handle(&UpstreamEvent::AssistantResponse {
            conversation_id: None,
            message_id: None,
            content: "hi".to_string(),
            content_type: None,
            completed: false,
        });
        let response = agg.finish();
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }
}

//! Anthropic request -> upstream `conversationState` (§4.4).
//!
//! Grounded on the teacher's transformer shape (a struct exposing a single
//! `transform_*` entry point, `src/providers/anthropic/transformers.rs`) but
//! built over our own strongly-typed request/response structs rather than a
//! `serde_json::Value` builder, since the upstream schema here is fixed and
//! narrow enough to model directly.

use crate::error::GatewayError;
use crate::model::anthropic::{AnthropicRequest, ContentBlock, ImageSource, Message, Role, Tool, ToolResultContent};
use crate::model::upstream::{
    AssistantResponseMessage, ChatMessage, ConversationState, HistoryEntry, ToolInputSchema,
    ToolSpecification, UpstreamImage, UpstreamRequest, UpstreamToolResult, UpstreamToolUse,
    UserInputMessage,
};
use serde_json::Value;

pub struct RequestTransformer;

impl RequestTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, req: &AnthropicRequest) -> Result<UpstreamRequest, GatewayError> {
        transform_chat(req)
    }
}

impl Default for RequestTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive substring match against the upstream model families.
pub fn map_model_name(model: &str) -> &'static str {
    let lower = model.to_lowercase();
    if lower.contains("opus") {
        "upstream-opus"
    } else if lower.contains("sonnet") {
        "upstream-sonnet"
    } else if lower.contains("haiku") {
        "upstream-haiku"
    } else {
        "upstream-sonnet"
    }
}

fn system_text(req: &AnthropicRequest) -> Option<String> {
    let base = req.system.as_ref().map(|s| s.as_text());

    let thinking_suffix = req
        .thinking
        .as_ref()
        .filter(|t| t.enabled())
        .map(|t| {
            let budget = t.budget_tokens.unwrap_or(0);
            format!("<thinking_mode>enabled</thinking_mode>\n<max_thinking_length>{budget}</max_thinking_length>")
        });

    match (base, thinking_suffix) {
        (Some(b), Some(t)) if !b.is_empty() => Some(format!("{b}\n{t}")),
        (Some(b), Some(t)) => {
            let _ = b;
            Some(t)
        }
        (Some(b), None) => Some(b),
        (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

fn extract_user_content(
    blocks: &[ContentBlock],
) -> (String, Vec<UpstreamImage>, Vec<UpstreamToolResult>) {
    let mut text_parts = Vec::new();
    let mut images = Vec::new();
    let mut tool_results = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => text_parts.push(text.clone()),
            ContentBlock::Image { source } => {
                if let ImageSource::Base64 { media_type, data } = source {
                    let format = media_type
                        .split('/')
                        .nth(1)
                        .unwrap_or(media_type)
                        .to_string();
                    images.push(UpstreamImage {
                        format,
                        bytes: data.clone(),
                    });
                }
                // URL images are dropped (§4.4).
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                let parts = match content {
                    None => Vec::new(),
                    Some(ToolResultContent::Text(s)) => vec![s.clone()],
                    Some(ToolResultContent::Blocks(blocks)) => blocks
                        .iter()
                        .filter_map(|b| match b {
                            ContentBlock::Text { text } => Some(text.clone()),
                            ContentBlock::Image { .. } => Some("[Image content]".to_string()),
                            _ => None,
                        })
                        .collect(),
                };
                tool_results.push(UpstreamToolResult {
                    tool_use_id: tool_use_id.clone(),
                    content: parts,
                    is_error: *is_error,
                });
            }
            ContentBlock::ToolUse { .. } | ContentBlock::Thinking { .. } => {}
        }
    }

    (text_parts.join("\n"), images, tool_results)
}

fn extract_assistant_content(blocks: &[ContentBlock]) -> (String, Vec<UpstreamToolUse>) {
    let mut text_parts = Vec::new();
    let mut tool_uses = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => text_parts.push(text.clone()),
            ContentBlock::ToolUse { id, name, input } => tool_uses.push(UpstreamToolUse {
                tool_use_id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => {}
        }
    }

    (text_parts.join("\n"), tool_uses)
}

fn build_user_input_message(blocks: &[ContentBlock]) -> UserInputMessage {
    let (content, images, tool_results) = extract_user_content(blocks);
    UserInputMessage {
        content,
        images,
        tool_results,
        tool_specifications: Vec::new(),
    }
}

fn build_assistant_response_message(blocks: &[ContentBlock]) -> AssistantResponseMessage {
    let (content, tool_uses) = extract_assistant_content(blocks);
    AssistantResponseMessage {
        content,
        tool_uses,
    }
}

/// Pair earlier messages into alternating user/assistant history entries,
/// filling orphans with an empty opposite entry (§4.4 "Pairing invariant").
fn pair_history(messages: &[Message]) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();
    let mut pending_user: Option<UserInputMessage> = None;

    for msg in messages {
        match msg.role {
            Role::User => {
                if let Some(user) = pending_user.take() {
                    entries.push(HistoryEntry {
                        user_input_message: user,
                        assistant_response_message: AssistantResponseMessage::default(),
                    });
                }
                pending_user = Some(build_user_input_message(&msg.content.as_blocks()));
            }
            Role::Assistant => {
                let assistant = build_assistant_response_message(&msg.content.as_blocks());
                match pending_user.take() {
                    Some(user) => entries.push(HistoryEntry {
                        user_input_message: user,
                        assistant_response_message: assistant,
                    }),
                    None => entries.push(HistoryEntry {
                        user_input_message: UserInputMessage::default(),
                        assistant_response_message: assistant,
                    }),
                }
            }
        }
    }

    if let Some(user) = pending_user {
        entries.push(HistoryEntry {
            user_input_message: user,
            assistant_response_message: AssistantResponseMessage::default(),
        });
    }

    entries
}

fn filtered_schema(schema: &Value) -> Value {
    let mut out = serde_json::Map::new();
    if let Some(obj) = schema.as_object() {
        for key in ["type", "properties", "required"] {
            if let Some(v) = obj.get(key) {
                out.insert(key.to_string(), v.clone());
            }
        }
    }
    Value::Object(out)
}

fn convert_tools(tools: &[Tool]) -> Vec<ToolSpecification> {
    tools
        .iter()
        .filter_map(|tool| match tool {
            Tool::Custom {
                name,
                description,
                input_schema,
            } => {
                let lower = name.to_lowercase();
                if lower == "web_search" || lower == "websearch" {
                    return None;
                }
                Some(ToolSpecification {
                    name: name.clone(),
                    description: description.clone().unwrap_or_default(),
                    input_schema: ToolInputSchema {
                        json: filtered_schema(input_schema),
                    },
                })
            }
            Tool::Other(_) => None,
        })
        .collect()
}

fn transform_chat(req: &AnthropicRequest) -> Result<UpstreamRequest, GatewayError> {
    if req.messages.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }

    let last_user_idx = req
        .messages
        .iter()
        .rposition(|m| m.role == Role::User)
        .ok_or_else(|| {
            GatewayError::InvalidRequest("messages must contain at least one user turn".to_string())
        })?;

    let current = &req.messages[last_user_idx];
    let mut current_message = build_user_input_message(&current.content.as_blocks());
    if let Some(tools) = &req.tools {
        current_message.tool_specifications = convert_tools(tools);
    }

    let earlier = &req.messages[..last_user_idx];
    let mut history = Vec::new();

    if let Some(system) = system_text(req) {
        history.push(HistoryEntry {
            user_input_message: UserInputMessage {
                content: system,
                ..Default::default()
            },
            assistant_response_message: AssistantResponseMessage {
                content: "I will follow these instructions.".to_string(),
                tool_uses: Vec::new(),
            },
        });
    }

    history.extend(pair_history(earlier));

    Ok(UpstreamRequest {
        conversation_state: ConversationState {
            conversation_id: uuid::Uuid::new_v4().to_string(),
            agent_continuation_id: uuid::Uuid::new_v4().to_string(),
            current_message: ChatMessage {
                user_input_message: current_message,
            },
            history,
        },
    })
}

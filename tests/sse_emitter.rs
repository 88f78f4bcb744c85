//! Literal §8 end-to-end scenarios 1 and 2: upstream event sequence -> SSE
//! event sequence, through the public `sse` API.

use kiro_gateway::sse::SseEmitter;
use kiro_gateway::wire::event::Event;
use serde_json::Value;

fn names(events: &[kiro_gateway::sse::SseEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.event).collect()
}

#[test]
fn scenario_1_simple_text() {
    let mut emitter = SseEmitter::new("claude-sonnet-4-5".to_string(), "upstream-sonnet");
    let mut all = Vec::new();

    all.extend(emitter.handle(&Event::AssistantResponse {
        conversation_id: None,
        message_id: None,
        content: "he".to_string(),
        content_type: None,
        completed: false,
    }));
    all.extend(emitter.handle(&Event::AssistantResponse {
        conversation_id: None,
        message_id: None,
        content: "llo".to_string(),
        content_type: None,
        completed: true,
    }));

    assert_eq!(
        names(&all),
        vec![
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop",
        ]
    );

    let deltas: Vec<&str> = all
        .iter()
        .filter(|e| e.event == "content_block_delta")
        .map(|e| e.data["delta"]["text"].as_str().unwrap())
        .collect();
    assert_eq!(deltas, vec!["he", "llo"]);
    assert_eq!(
        all.last().unwrap().data,
        serde_json::json!({"type": "message_stop"})
    );

    let message_delta = all.iter().find(|e| e.event == "message_delta").unwrap();
    assert_eq!(message_delta.data["delta"]["stop_reason"], "end_turn");

    let wire = all[0].to_wire();
    assert!(wire.starts_with("event: message_start\ndata: "));
    assert!(wire.ends_with("\n\n"));
}

#[test]
fn scenario_2_text_then_tool() {
    let mut emitter = SseEmitter::new("claude-sonnet-4-5".to_string(), "upstream-sonnet");
    let mut all = Vec::new();

    all.extend(emitter.handle(&Event::AssistantResponse {
        conversation_id: None,
        message_id: None,
        content: "ok, calling".to_string(),
        content_type: None,
        completed: false,
    }));
    all.extend(emitter.handle(&Event::ToolUse {
        name: Some("search".to_string()),
        tool_use_id: "t1".to_string(),
        input: Some(Value::Object(
            [("q".to_string(), Value::String("x".to_string()))]
                .into_iter()
                .collect(),
        )),
        stop: false,
    }));
    all.extend(emitter.handle(&Event::ToolUse {
        name: None,
        tool_use_id: "t1".to_string(),
        input: Some(Value::String(String::new())),
        stop: true,
    }));

    let indices: Vec<i64> = all
        .iter()
        .filter(|e| e.event == "content_block_start" || e.event == "content_block_stop")
        .map(|e| e.data["index"].as_i64().unwrap())
        .collect();
    // text block (0) opens and closes, then tool block (1) opens and closes.
    assert_eq!(indices, vec![0, 0, 1, 1]);

    let tool_start = all
        .iter()
        .find(|e| e.event == "content_block_start" && e.data["index"] == 1)
        .unwrap();
    assert_eq!(tool_start.data["content_block"]["type"], "tool_use");
    assert_eq!(tool_start.data["content_block"]["input"], serde_json::json!({}));

    let input_delta = all.iter().find(|e| e.event == "content_block_delta" && e.data["index"] == 1).unwrap();
    assert_eq!(input_delta.data["delta"]["partial_json"], "{\"q\":\"x\"}");

    let message_delta = all.iter().find(|e| e.event == "message_delta").unwrap();
    assert_eq!(message_delta.data["delta"]["stop_reason"], "tool_use");
}

#[test]
fn context_usage_of_fifty_percent_yields_100k_input_tokens() {
    let mut emitter = SseEmitter::new("m".to_string(), "upstream-sonnet");
    emitter.handle(&Event::ContextUsage {
        context_usage_percentage: 50.0,
    });
    let finishing = emitter.finish();
    let message_delta = finishing.iter().find(|e| e.event == "message_delta").unwrap();
    assert_eq!(message_delta.data["usage"]["input_tokens"], 100_000);
}

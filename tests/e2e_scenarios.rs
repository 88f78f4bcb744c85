//! Literal §8 end-to-end scenarios not already covered by
//! `sse_emitter.rs` / `token_manager.rs`: scenario 4's persisted-expiry
//! window and scenario 6's non-streaming aggregation response shape.

use chrono::{DateTime, Utc};
use kiro_gateway::auth::TokenManager;
use kiro_gateway::config::Credentials;
use kiro_gateway::model::anthropic::ResponseContentBlock;
use kiro_gateway::sse::Aggregator;
use kiro_gateway::wire::event::Event;
use serde_json::Value;

fn expired_credentials() -> Credentials {
    Credentials {
        access_token: None,
        refresh_token: "r".repeat(120),
        profile_arn: None,
        expires_at: Some("2000-01-01T00:00:00Z".to_string()),
        auth_method: None,
        provider: None,
    }
}

// Scenario 4: after a refresh, the next call to `ensure_valid_token` returns
// the new token without hitting the network again, and the persisted
// `expiresAt` lands within 3600s (+/- 5s) of the refresh.
#[tokio::test]
async fn scenario_4_refresh_then_reuse_and_expiry_window() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/refreshToken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"A2","expiresIn":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let path = std::env::temp_dir().join(format!(
        "kiro-gateway-e2e-scenario4-{}.json",
        std::process::id()
    ));

    let manager = TokenManager::new(
        reqwest::Client::new(),
        expired_credentials(),
        path.clone(),
        "us-east-1".to_string(),
        "1.0.0".to_string(),
        None,
    )
    .with_endpoint_override(server.url());

    let before = Utc::now();
    let first = manager.ensure_valid_token().await.expect("first refresh");
    assert_eq!(first, "A2");

    // Second call observes a fresh, non-expiring token and must not refresh again.
    let second = manager.ensure_valid_token().await.expect("cached token");
    assert_eq!(second, "A2");
    mock.assert_async().await;

    let on_disk = Credentials::load(&path).expect("credentials file should parse back");
    let expires_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&on_disk.expires_at.unwrap())
        .unwrap()
        .with_timezone(&Utc);
    let delta = (expires_at - before).num_seconds();
    assert!((3595..=3605).contains(&delta), "expiresAt delta was {delta}s");

    std::fs::remove_file(&path).ok();
}

// Scenario 6: the same text-then-tool event sequence as scenario 2, but
// aggregated into one non-streaming response instead of SSE.
#[test]
fn scenario_6_non_streaming_aggregation() {
    let mut agg = Aggregator::new("claude-sonnet-4-5".to_string(), "upstream-sonnet");

    agg.handle(&Event::AssistantResponse {
        conversation_id: None,
        message_id: None,
        content: "ok, calling".to_string(),
        content_type: None,
        completed: false,
    });
    agg.handle(&Event::ToolUse {
        name: Some("search".to_string()),
        tool_use_id: "t1".to_string(),
        input: Some(Value::Object(
            [("q".to_string(), Value::String("x".to_string()))]
                .into_iter()
                .collect(),
        )),
        stop: false,
    });
    agg.handle(&Event::ToolUse {
        name: None,
        tool_use_id: "t1".to_string(),
        input: Some(Value::String(String::new())),
        stop: true,
    });

    let response = agg.finish();

    assert_eq!(response.r#type, "message");
    assert_eq!(response.role, "assistant");
    assert!(response.id.starts_with("msg_"));
    assert_eq!(response.model, "claude-sonnet-4-5");
    assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    assert_eq!(response.stop_sequence, None);
    assert_eq!(response.content.len(), 2);

    match &response.content[0] {
        ResponseContentBlock::Text { text } => assert_eq!(text, "ok, calling"),
        other => panic!("expected text block first, got {other:?}"),
    }
    match &response.content[1] {
        ResponseContentBlock::ToolUse { id, name, input } => {
            assert_eq!(id, "t1");
            assert_eq!(name, "search");
            assert_eq!(input["q"], "x");
        }
        other => panic!("expected tool_use block second, got {other:?}"),
    }
}

//! Token manager properties (§8): single-flight refresh under concurrency,
//! and that persisted credentials parse back correctly.

use kiro_gateway::auth::TokenManager;
use kiro_gateway::config::Credentials;
use std::sync::Arc;

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

#[tokio::test]
async fn concurrent_callers_trigger_exactly_one_refresh() {
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
        "kiro-gateway-tm-test-{}.json",
        std::process::id()
    ));

    let manager = Arc::new(
        TokenManager::new(
            reqwest::Client::new(),
            expired_credentials(),
            path.clone(),
            "us-east-1".to_string(),
            "1.0.0".to_string(),
            None,
        )
        .with_endpoint_override(server.url()),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move { manager.ensure_valid_token().await }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().expect("ensure_valid_token"));
    }

    assert!(tokens.iter().all(|t| t == "A2"));
    mock.assert_async().await;

    let on_disk = Credentials::load(&path).expect("credentials file should parse back");
    assert_eq!(on_disk.access_token.as_deref(), Some("A2"));
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn refresh_maps_401_to_auth_expired() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/refreshToken")
        .with_status(401)
        .with_body("unauthorized")
        .create_async()
        .await;

    let path = std::env::temp_dir().join(format!(
        "kiro-gateway-tm-test-401-{}.json",
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

    let err = manager.ensure_valid_token().await.unwrap_err();
    assert!(matches!(err, kiro_gateway::error::GatewayError::AuthExpired(_)));
    std::fs::remove_file(&path).ok();
}

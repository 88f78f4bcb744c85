//! Upstream HTTP client: builds the signed POST and streams the raw,
//! binary-framed response body (§4.7).
//!
//! Grounded on `AnthropicStreaming::create_chat_stream`'s header-building
//! closure in the teacher's streaming provider client — same idea of
//! composing a fixed header set around a bearer token, then handing the
//! response's `bytes_stream()` to the caller rather than buffering it.

use crate::error::GatewayError;
use crate::model::upstream::UpstreamRequest;
use bytes::Bytes;
use futures_util::Stream;
use std::time::Duration;
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12 * 60);

pub struct UpstreamClient {
    http: reqwest::Client,
    region: String,
    kiro_version: String,
    node_version: String,
    system_version: String,
}

impl UpstreamClient {
    pub fn new(region: String, kiro_version: String, node_version: String, system_version: String) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            region,
            kiro_version,
            node_version,
            system_version,
        })
    }

    /// POST the converted request upstream; on success returns a stream of
    /// raw body chunks ready to be fed to the frame decoder.
    pub async fn generate_assistant_response(
        &self,
        access_token: &str,
        machine_id: &str,
        request: &UpstreamRequest,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>> + use<>, GatewayError> {
        let url = format!("https://q.{}.amazonaws.com/generateAssistantResponse", self.region);
        let user_agent = format!(
            "{}-{}-{}-{}",
            self.region, machine_id, self.node_version, self.system_version
        );
        let invocation_id = Uuid::new_v4().to_string();

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header("x-amzn-codewhisperer-optout", "true")
            .header("x-amzn-kiro-agent-mode", "vibe")
            .header("x-amz-user-agent", format!("KiroIDE-{}", self.kiro_version))
            .header("user-agent", user_agent)
            .header("amz-sdk-invocation-id", invocation_id)
            .header("amz-sdk-request", "attempt=1; max=3")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ApiError {
                status: status.as_u16(),
                message: "upstream request failed".to_string(),
                body: Some(body.chars().take(2000).collect()),
            });
        }

        Ok(response.bytes_stream())
    }
}

//! Route handlers: validation, dispatch to streaming/non-streaming pipelines
//! (§4.8).

use crate::auth::TokenManager;
use crate::convert::count_tokens;
use crate::convert::request::{RequestTransformer, map_model_name};
use crate::error::GatewayError;
use crate::model::anthropic::AnthropicRequest;
use crate::server::models;
use crate::sse::{Aggregator, SseEmitter};
use crate::stream_aggregator::StreamAggregator;
use crate::upstream_client::UpstreamClient;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseWireEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures_util::{Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;

pub struct AppState {
    pub token_manager: TokenManager,
    pub upstream: UpstreamClient,
    pub machine_id: String,
    pub transformer: RequestTransformer,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/v1/models/{id}", get(get_model))
        .route("/v1/messages", post(create_message))
        .route("/v1/messages/count_tokens", post(count_tokens_handler))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_models() -> Json<serde_json::Value> {
    Json(json!({ "data": models::CATALOG }))
}

async fn get_model(Path(id): Path<String>) -> Response {
    match models::find(&id) {
        Some(info) => Json(info).into_response(),
        None => error_response(GatewayError::NotFound(format!("unknown model: {id}"))),
    }
}

fn error_response(err: GatewayError) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let (status, body) = err.to_response(Some(request_id));
    (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(body)).into_response()
}

fn validate(req: &AnthropicRequest) -> Result<(), GatewayError> {
    if !models::is_known(&req.model) {
        return Err(GatewayError::InvalidRequest(format!(
            "unknown model: {}",
            req.model
        )));
    }
    if req.max_tokens == 0 {
        return Err(GatewayError::InvalidRequest(
            "max_tokens must be greater than 0".to_string(),
        ));
    }
    if req.messages.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }
    Ok(())
}

async fn create_message(State(state): State<Arc<AppState>>, Json(req): Json<AnthropicRequest>) -> Response {
    if let Err(e) = validate(&req) {
        return error_response(e);
    }

    let upstream_model = map_model_name(&req.model);
    let upstream_req = match state.transformer.transform(&req) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };

    let access_token = match state.token_manager.ensure_valid_token().await {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };

    let body_stream = match state
        .upstream
        .generate_assistant_response(&access_token, &state.machine_id, &upstream_req)
        .await
    {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let events = StreamAggregator::new().events(body_stream).boxed();

    if req.stream {
        streaming_response(req.model, upstream_model, events)
    } else {
        aggregated_response(req.model, upstream_model, events).await
    }
}

fn streaming_response(
    model: String,
    upstream_model: &'static str,
    mut events: std::pin::Pin<Box<dyn Stream<Item = crate::wire::event::Event> + Send>>,
) -> Response {
    // Owns the emitter across the whole upstream read so `finish()` can run
    // once the upstream stream drains, even if it never sent a terminating
    // event itself (§4.5 ordering contract, §7 "degrades gracefully").
    let sse_stream = async_stream::stream! {
        let mut emitter = SseEmitter::new(model, upstream_model);
        while let Some(event) = events.next().await {
            for sse_event in emitter.handle(&event) {
                yield Ok::<_, Infallible>(to_wire_event(&sse_event));
            }
        }
        for sse_event in emitter.finish() {
            yield Ok::<_, Infallible>(to_wire_event(&sse_event));
        }
    };

    Sse::new(sse_stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn to_wire_event(event: &crate::sse::SseEvent) -> SseWireEvent {
    SseWireEvent::default()
        .event(event.event)
        .data(serde_json::to_string(&event.data).unwrap_or_else(|_| "{}".to_string()))
}

async fn aggregated_response(
    model: String,
    upstream_model: &'static str,
    mut events: std::pin::Pin<Box<dyn Stream<Item = crate::wire::event::Event> + Send>>,
) -> Response {
    let mut aggregator = Aggregator::new(model, upstream_model);
    while let Some(event) = events.next().await {
        aggregator.handle(&event);
    }
    Json(aggregator.finish()).into_response()
}

async fn count_tokens_handler(Json(req): Json<AnthropicRequest>) -> Json<serde_json::Value> {
    let input_tokens = count_tokens::estimate_input_tokens(&req);
    Json(json!({ "input_tokens": input_tokens }))
}

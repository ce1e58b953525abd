// OpenAI Handler - /v1/chat/completions, /v1/models
//
// The same endpoint serves the conversation shape and the browser UI's
// prompt + images shape.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use super::common::{finish, new_trace_id, parse_json_body, relay};
use super::AppState;
use crate::proxy::mappers::request::normalize_openai;
use crate::proxy::mappers::OutputProtocol;

/// Handle OpenAI Chat Completions: POST /v1/chat/completions
pub async fn handle_chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let trace_id = new_trace_id("req");
    let body = parse_json_body(body);

    let stream = body
        .as_ref()
        .ok()
        .and_then(|b| b.get("stream"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let protocol = OutputProtocol::openai(stream);

    let outcome = relay(&state, &headers, None, &trace_id, || normalize_openai(body?)).await;
    finish(&state, protocol, outcome, &trace_id)
}

/// Handle OpenAI Model List: GET /v1/models
pub async fn handle_list_models(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "object": "list",
        "data": [{
            "id": state.upstream.model(),
            "object": "model",
            "created": chrono::Utc::now().timestamp(),
            "owned_by": "imagegen-relay"
        }]
    }))
}

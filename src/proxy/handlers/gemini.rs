// Gemini Handler - /v1beta/models/:model
//
// Path param is "<model>:<method>", e.g. "gemini-2.5-flash-image:streamGenerateContent".

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use super::common::{finish, new_trace_id, parse_json_body, relay};
use super::AppState;
use crate::proxy::mappers::request::normalize_gemini;
use crate::proxy::mappers::OutputProtocol;

/// Split "model:method"; a bare model name means generateContent
pub fn parse_model_action(model_action: &str) -> (String, String) {
    match model_action.rsplit_once(':') {
        Some((model, method)) => (model.to_string(), method.to_string()),
        None => (model_action.to_string(), "generateContent".to_string()),
    }
}

fn wants_sse(query: Option<&str>) -> bool {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes()).any(|(k, v)| k == "alt" && v == "sse")
        })
        .unwrap_or(false)
}

/// Handle Gemini generateContent / streamGenerateContent
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(model_action): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let trace_id = new_trace_id("gemini");
    let (model_name, method) = parse_model_action(&model_action);
    tracing::info!("[{}] Gemini Request: {}/{}", trace_id, model_name, method);

    let protocol = match OutputProtocol::gemini(&method, wants_sse(query.as_deref())) {
        Ok(p) => p,
        Err(e) => return finish(&state, OutputProtocol::GeminiGenerate, Err(e), &trace_id),
    };

    let body = parse_json_body(body);
    let outcome = relay(&state, &headers, query.as_deref(), &trace_id, || {
        normalize_gemini(body?, &model_name, protocol.is_stream())
    })
    .await;

    finish(&state, protocol, outcome, &trace_id)
}

/// Handle Gemini Model List: GET /v1beta/models
pub async fn handle_list_models(State(state): State<AppState>) -> impl IntoResponse {
    let id = state.upstream.model();
    Json(json!({
        "models": [{
            "name": format!("models/{}", id),
            "version": "001",
            "displayName": id,
            "description": "",
            "supportedGenerationMethods": ["generateContent", "streamGenerateContent"]
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_action() {
        assert_eq!(
            parse_model_action("gemini-2.5-flash-image:streamGenerateContent"),
            ("gemini-2.5-flash-image".to_string(), "streamGenerateContent".to_string())
        );
        assert_eq!(
            parse_model_action("gemini-pro"),
            ("gemini-pro".to_string(), "generateContent".to_string())
        );
    }

    #[test]
    fn test_wants_sse() {
        assert!(wants_sse(Some("alt=sse")));
        assert!(wants_sse(Some("key=abc&alt=sse")));
        assert!(!wants_sse(Some("alt=json")));
        assert!(!wants_sse(None));
    }
}

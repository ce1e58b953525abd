// Common handler utilities - the shared relay pipeline
//
// credentials → normalize → one upstream call → render in the caller's protocol

use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::Value;
use tracing::{error, info, warn};

use super::AppState;
use crate::proxy::error::RelayError;
use crate::proxy::mappers::{NormalizedRequest, OutputProtocol, UpstreamResult};
use crate::proxy::middleware::auth::extract_credentials;

pub fn new_trace_id(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

/// Decode the buffered body; a body over `DefaultBodyLimit` arrives here as a rejection.
pub fn parse_json_body(body: Result<Bytes, BytesRejection>) -> Result<Value, RelayError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge(rejection.body_text())
        } else {
            RelayError::InvalidRequest(rejection.body_text())
        }
    })?;
    if body.is_empty() {
        return Err(RelayError::InvalidRequest("Empty request body".to_string()));
    }
    serde_json::from_slice(&body).map_err(|e| RelayError::InvalidRequest(format!("Invalid JSON: {}", e)))
}

/// Run the pipeline up to the upstream result.
///
/// Credentials are checked before the body is normalized, and both happen
/// before the upstream is contacted.
pub async fn relay<F>(
    state: &AppState,
    headers: &HeaderMap,
    query: Option<&str>,
    trace_id: &str,
    normalize: F,
) -> Result<(NormalizedRequest, UpstreamResult), RelayError>
where
    F: FnOnce() -> Result<NormalizedRequest, RelayError>,
{
    let credentials = extract_credentials(headers, query, state.default_api_key())?;
    let req = normalize()?;

    info!(
        "[{}] Relaying prompt ({} chars, {} image(s), stream: {})",
        trace_id,
        req.prompt.chars().count(),
        req.images.len(),
        req.stream
    );

    let result = state.upstream.generate(&credentials, &req).await?;
    Ok((req, result))
}

/// Turn the pipeline outcome into the response for `protocol`.
pub fn finish(
    state: &AppState,
    protocol: OutputProtocol,
    outcome: Result<(NormalizedRequest, UpstreamResult), RelayError>,
    trace_id: &str,
) -> Response {
    match outcome {
        Ok((req, result)) => {
            let model = req.model.as_deref().unwrap_or(state.upstream.model());
            info!("[{}] ✓ Responding as {}", trace_id, protocol.name());
            protocol.render(&result, model, &state.config.stream)
        }
        Err(err) => {
            if err.is_client_side() {
                warn!("[{}] Rejected request: {}", trace_id, err);
            } else {
                error!("[{}] Relay failed: {}", trace_id, err);
            }
            protocol.error_response(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trace_id() {
        let id = new_trace_id("req");
        assert!(id.starts_with("req_"));
        assert_eq!(id.len(), "req_".len() + 8);
    }

    #[test]
    fn test_parse_json_body() {
        let body = |raw: &'static [u8]| -> Result<Bytes, BytesRejection> {
            Ok(Bytes::from_static(raw))
        };
        assert!(parse_json_body(body(br#"{"a":1}"#)).is_ok());
        assert!(matches!(parse_json_body(body(b"")), Err(RelayError::InvalidRequest(_))));
        assert!(matches!(parse_json_body(body(b"{oops")), Err(RelayError::InvalidRequest(_))));
    }
}

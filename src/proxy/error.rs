// Relay error type
//
// Every failure is request-scoped. The handler renders it in the caller's
// protocol shape (see `mappers::protocol::OutputProtocol::error_response`).

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing API key. Provide it via the Authorization header (Bearer) or x-goog-api-key")]
    MissingCredentials,

    #[error("Missing prompt: the request contains no non-empty text part")]
    MissingPrompt,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream returned {status} {status_text}: {body}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),

    #[error("Upstream response contained no usable image or text")]
    EmptyUpstreamResult,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingCredentials => StatusCode::UNAUTHORIZED,
            RelayError::MissingPrompt | RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            RelayError::Transport(_)
            | RelayError::InvalidUpstreamResponse(_)
            | RelayError::EmptyUpstreamResult => StatusCode::BAD_GATEWAY,
        }
    }

    /// True when the failure happened before the upstream was contacted
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            RelayError::MissingCredentials
                | RelayError::MissingPrompt
                | RelayError::InvalidRequest(_)
                | RelayError::PayloadTooLarge(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::MissingCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RelayError::MissingPrompt.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::PayloadTooLarge("limit".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(RelayError::EmptyUpstreamResult.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            RelayError::Transport("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_status_passthrough() {
        let err = RelayError::Upstream {
            status: 429,
            status_text: "Too Many Requests".into(),
            body: "{}".into(),
        };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.to_string().contains("429 Too Many Requests"));

        // A non-error upstream status never leaks through as success
        let err = RelayError::Upstream {
            status: 200,
            status_text: "OK".into(),
            body: "error object".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_is_client_side() {
        assert!(RelayError::MissingCredentials.is_client_side());
        assert!(RelayError::MissingPrompt.is_client_side());
        assert!(!RelayError::EmptyUpstreamResult.is_client_side());
    }
}

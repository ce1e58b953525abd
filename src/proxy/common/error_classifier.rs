// Error classification module
// Maps relay failures onto the error vocabularies of the two caller protocols

use reqwest::Error;

/// Classify a transport-level reqwest error and return (error_type, english_message).
pub fn classify_transport_error(error: &Error) -> (&'static str, &'static str) {
    if error.is_timeout() {
        (
            "timeout_error",
            "Upstream request timed out, please check your network connection",
        )
    } else if error.is_connect() {
        (
            "connection_error",
            "Connection to upstream failed, please check your network or proxy settings",
        )
    } else if error.is_decode() {
        (
            "decode_error",
            "Upstream response could not be decoded",
        )
    } else if error.is_body() {
        ("body_error", "Upstream response body was interrupted")
    } else {
        ("unknown_error", "Unknown upstream error occurred")
    }
}

/// Classify an HTTP status into (openai_error_type, gemini_status).
///
/// The OpenAI value goes in `error.type`, the Gemini value in `error.status`.
pub fn classify_http_status(status: u16) -> (&'static str, &'static str) {
    match status {
        400 => ("invalid_request_error", "INVALID_ARGUMENT"),
        401 => ("authentication_error", "UNAUTHENTICATED"),
        403 => ("permission_error", "PERMISSION_DENIED"),
        404 => ("not_found_error", "NOT_FOUND"),
        413 => ("invalid_request_error", "INVALID_ARGUMENT"),
        429 => ("rate_limit_error", "RESOURCE_EXHAUSTED"),
        502 => ("upstream_error", "UNAVAILABLE"),
        503 => ("server_error", "UNAVAILABLE"),
        504 => ("timeout_error", "DEADLINE_EXCEEDED"),
        500..=599 => ("server_error", "INTERNAL"),
        _ => ("unknown_error", "UNKNOWN"),
    }
}

// 请求监控中间件
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Protocol family of an inbound path, for log lines
pub fn protocol_of(path: &str) -> Option<&'static str> {
    if path.starts_with("/v1beta/models") || path.contains(":generateContent") || path.contains(":streamGenerateContent") {
        Some("gemini")
    } else if path.starts_with("/v1/") {
        Some("openai")
    } else {
        None
    }
}

/// 请求监控中间件
///
/// Logs method, path, status and latency. Health checks and static assets are
/// logged at trace level only.
pub async fn monitor_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let protocol = protocol_of(&path);

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status();

    match protocol {
        Some(protocol) if status.is_success() => tracing::info!(
            "{} {} [{}] → {} ({}ms)",
            method,
            path,
            protocol,
            status.as_u16(),
            elapsed_ms
        ),
        Some(protocol) => tracing::warn!(
            "{} {} [{}] → {} ({}ms)",
            method,
            path,
            protocol,
            status.as_u16(),
            elapsed_ms
        ),
        None => tracing::trace!("{} {} → {} ({}ms)", method, path, status.as_u16(), elapsed_ms),
    }

    response
}

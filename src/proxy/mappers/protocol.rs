// Output protocol strategy
//
// One enum selected by inbound path + stream flag decides how an
// UpstreamResult (or a RelayError) goes back on the wire.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use futures::Stream;
use serde_json::{json, Value};

use super::gemini::{build_gemini_chunks, transform_gemini_response};
use super::models::UpstreamResult;
use super::openai::{build_openai_chunks, transform_openai_response};
use crate::models::StreamConfig;
use crate::proxy::common::error_classifier::classify_http_status;
use crate::proxy::error::RelayError;

/// Terminal sentinel written after the last chunk of every stream
pub const STREAM_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFraming {
    /// `data: <json>\n\n`
    Sse,
    /// `<json>\n`
    Ndjson,
}

impl StreamFraming {
    pub fn content_type(&self) -> &'static str {
        match self {
            StreamFraming::Sse => "text/event-stream",
            StreamFraming::Ndjson => "application/x-ndjson",
        }
    }

    pub fn frame(&self, payload: &str) -> Bytes {
        match self {
            StreamFraming::Sse => Bytes::from(format!("data: {}\n\n", payload)),
            StreamFraming::Ndjson => Bytes::from(format!("{}\n", payload)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputProtocol {
    OpenAiChat,
    OpenAiStream,
    GeminiGenerate,
    GeminiStream(StreamFraming),
}

impl OutputProtocol {
    pub fn openai(stream: bool) -> Self {
        if stream {
            OutputProtocol::OpenAiStream
        } else {
            OutputProtocol::OpenAiChat
        }
    }

    /// Gemini method name plus the `alt` query parameter select the protocol
    pub fn gemini(method: &str, alt_sse: bool) -> Result<Self, RelayError> {
        match method {
            "generateContent" => Ok(OutputProtocol::GeminiGenerate),
            "streamGenerateContent" => Ok(OutputProtocol::GeminiStream(if alt_sse {
                StreamFraming::Sse
            } else {
                StreamFraming::Ndjson
            })),
            other => Err(RelayError::InvalidRequest(format!(
                "Unsupported method: {}",
                other
            ))),
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, OutputProtocol::OpenAiStream | OutputProtocol::GeminiStream(_))
    }

    pub fn is_gemini(&self) -> bool {
        matches!(self, OutputProtocol::GeminiGenerate | OutputProtocol::GeminiStream(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputProtocol::OpenAiChat => "openai-chat",
            OutputProtocol::OpenAiStream => "openai-stream",
            OutputProtocol::GeminiGenerate => "gemini-generate",
            OutputProtocol::GeminiStream(_) => "gemini-stream",
        }
    }

    /// Ordered chunk payloads for streaming protocols (without the sentinel)
    pub fn stream_chunks(&self, result: &UpstreamResult, model: &str, text_chunk_chars: usize) -> Vec<Value> {
        match self {
            OutputProtocol::OpenAiStream => build_openai_chunks(result, model, text_chunk_chars),
            OutputProtocol::GeminiStream(_) => build_gemini_chunks(result, model, text_chunk_chars),
            OutputProtocol::OpenAiChat | OutputProtocol::GeminiGenerate => Vec::new(),
        }
    }

    fn framing(&self) -> StreamFraming {
        match self {
            OutputProtocol::GeminiStream(framing) => *framing,
            _ => StreamFraming::Sse,
        }
    }

    /// Render a successful result.
    pub fn render(&self, result: &UpstreamResult, model: &str, stream: &StreamConfig) -> Response {
        match self {
            OutputProtocol::OpenAiChat => {
                Json(transform_openai_response(result, model)).into_response()
            }
            OutputProtocol::GeminiGenerate => {
                Json(transform_gemini_response(result, model)).into_response()
            }
            OutputProtocol::OpenAiStream | OutputProtocol::GeminiStream(_) => {
                let chunks = self.stream_chunks(result, model, stream.text_chunk_chars);
                let framing = self.framing();
                let delay = Duration::from_millis(stream.chunk_delay_ms);

                Response::builder()
                    .header(header::CONTENT_TYPE, framing.content_type())
                    .header(header::CACHE_CONTROL, "no-cache")
                    .header(header::CONNECTION, "keep-alive")
                    .header("X-Accel-Buffering", "no")
                    .body(Body::from_stream(chunk_stream(chunks, framing, delay)))
                    .unwrap_or_else(|e| {
                        tracing::error!("Failed to build stream response: {}", e);
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    })
            }
        }
    }

    /// Render an error in the caller's error shape.
    pub fn error_response(&self, err: &RelayError) -> Response {
        let status = err.status_code();
        (status, Json(self.error_body(err))).into_response()
    }

    pub fn error_body(&self, err: &RelayError) -> Value {
        let status = err.status_code();
        let (openai_type, gemini_status) = classify_http_status(status.as_u16());

        if self.is_gemini() {
            json!({
                "error": {
                    "code": status.as_u16(),
                    "message": err.to_string(),
                    "status": gemini_status
                }
            })
        } else {
            json!({
                "error": {
                    "message": err.to_string(),
                    "type": openai_type,
                    "code": status.as_u16()
                }
            })
        }
    }
}

/// Emit the chunks with a fixed delay between them, then the sentinel, then end.
pub fn chunk_stream(
    chunks: Vec<Value>,
    framing: StreamFraming,
    delay: Duration,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        for (idx, chunk) in chunks.into_iter().enumerate() {
            if idx > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let payload = serde_json::to_string(&chunk).unwrap_or_default();
            yield Ok::<Bytes, Infallible>(framing.frame(&payload));
        }
        yield Ok::<Bytes, Infallible>(framing.frame(STREAM_SENTINEL));
    }
}

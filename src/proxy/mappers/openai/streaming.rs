// OpenAI 流式转换
//
// UpstreamResult → chat.completion.chunk sequence:
//   role chunk → text deltas → image chunk → finish chunk
// The `[DONE]` sentinel is appended by the stream writer.

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::proxy::common::common_utils::split_text_chunks;
use crate::proxy::mappers::models::UpstreamResult;

pub fn build_openai_chunks(result: &UpstreamResult, model: &str, text_chunk_chars: usize) -> Vec<Value> {
    let stream_id = format!("chatcmpl-{}", Uuid::new_v4().simple());
    let created_ts = Utc::now().timestamp();

    let chunk = |delta: Value, finish_reason: Value| {
        json!({
            "id": &stream_id,
            "object": "chat.completion.chunk",
            "created": created_ts,
            "model": model,
            "choices": [{
                "index": 0,
                "delta": delta,
                "finish_reason": finish_reason
            }]
        })
    };

    let mut chunks = vec![chunk(json!({ "role": "assistant", "content": "" }), Value::Null)];

    if let Some(text) = result.text() {
        for piece in split_text_chunks(text, text_chunk_chars) {
            chunks.push(chunk(json!({ "content": piece }), Value::Null));
        }
    }

    if let Some(image) = result.image() {
        chunks.push(chunk(
            json!({
                "images": [{
                    "type": "image_url",
                    "image_url": { "url": image.to_url() }
                }]
            }),
            Value::Null,
        ));
    }

    chunks.push(chunk(json!({}), json!("stop")));
    chunks
}

// Gemini response builders
//
// UpstreamResult → generateContent document. Inline images become
// `inlineData`, remote URLs become `fileData`.

use serde_json::{json, Value};

use crate::proxy::mappers::models::{ImageRef, UpstreamResult};

/// Gemini part for an image reference
pub fn image_part(image: &ImageRef) -> Value {
    match image {
        ImageRef::Inline { mime_type, data } => json!({
            "inlineData": { "mimeType": mime_type, "data": data }
        }),
        ImageRef::Url(url) => json!({
            "fileData": { "mimeType": image.mime_type(), "fileUri": url }
        }),
    }
}

/// One `candidates[0]` payload with the given parts
pub fn candidate_chunk(parts: Vec<Value>, finish_reason: Option<&str>, model: &str) -> Value {
    let mut candidate = json!({
        "content": { "role": "model", "parts": parts },
        "index": 0
    });
    if let Some(reason) = finish_reason {
        candidate["finishReason"] = json!(reason);
    }
    json!({
        "candidates": [candidate],
        "modelVersion": model
    })
}

pub fn transform_gemini_response(result: &UpstreamResult, model: &str) -> Value {
    let mut parts = Vec::new();
    if let Some(text) = result.text().filter(|t| !t.is_empty()) {
        parts.push(json!({ "text": text }));
    }
    if let Some(image) = result.image() {
        parts.push(image_part(image));
    }

    let mut response = candidate_chunk(parts, Some("STOP"), model);
    response["responseId"] = json!(uuid::Uuid::new_v4().simple().to_string());
    response
}

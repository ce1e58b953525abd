// Gemini streamGenerateContent chunk builder
//
// Order: text chunks → image chunk → final chunk (finishReason STOP, no parts).

use serde_json::{json, Value};

use super::response::{candidate_chunk, image_part};
use crate::proxy::common::common_utils::split_text_chunks;
use crate::proxy::mappers::models::UpstreamResult;

pub fn build_gemini_chunks(result: &UpstreamResult, model: &str, text_chunk_chars: usize) -> Vec<Value> {
    let mut chunks = Vec::new();

    if let Some(text) = result.text() {
        for piece in split_text_chunks(text, text_chunk_chars) {
            chunks.push(candidate_chunk(vec![json!({ "text": piece })], None, model));
        }
    }

    if let Some(image) = result.image() {
        chunks.push(candidate_chunk(vec![image_part(image)], None, model));
    }

    chunks.push(candidate_chunk(Vec::new(), Some("STOP"), model));
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::mappers::models::{GeneratedImage, ImageRef};

    #[test]
    fn test_image_chunk_then_stop() {
        let result = UpstreamResult::Image(GeneratedImage {
            image: ImageRef::Inline { mime_type: "image/png".into(), data: "Zm9v".into() },
            caption: None,
        });
        let chunks = build_gemini_chunks(&result, "m", 16);

        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0]["candidates"][0]["content"]["parts"][0]["inlineData"]["data"],
            "Zm9v"
        );
        assert!(chunks[0]["candidates"][0].get("finishReason").is_none());
        assert_eq!(chunks[1]["candidates"][0]["finishReason"], "STOP");
        assert!(chunks[1]["candidates"][0]["content"]["parts"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_text_is_chunked() {
        let chunks = build_gemini_chunks(&UpstreamResult::Text("hello world".into()), "m", 5);
        // "hello", " worl", "d", stop
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[1]["candidates"][0]["content"]["parts"][0]["text"], " worl");
    }
}

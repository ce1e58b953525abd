// Upstream reply → UpstreamResult
//
// Lookup order on `choices[0].message`:
//   1. non-standard `images` array (first entry)
//   2. `content` string that is itself an inline base64 image (payload must decode)
//   3. `content` array holding an `image_url` part
//   4. plain `content` text

use serde_json::Value;

use super::models::{GeneratedImage, ImageRef, UpstreamResult};
use crate::proxy::common::common_utils::{decode_base64, is_inline_image, parse_data_url};
use crate::proxy::error::RelayError;

pub fn extract_result(response: &Value) -> Result<UpstreamResult, RelayError> {
    // Some providers answer 200 with an error object
    if let Some(err) = response.get("error").filter(|e| !e.is_null()) {
        let status = err
            .get("code")
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(502);
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(RelayError::Upstream {
            status,
            status_text: "Upstream Error".to_string(),
            body: message,
        });
    }

    let message = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .ok_or(RelayError::EmptyUpstreamResult)?;

    let content = message.get("content");
    let content_text = content.and_then(|c| c.as_str()).map(str::trim);

    if let Some(image) = message
        .get("images")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.iter().find_map(image_from_part))
    {
        let caption = content_text
            .filter(|t| !t.is_empty() && !is_inline_image(t))
            .map(str::to_string)
            .or_else(|| content.and_then(text_from_parts));
        return Ok(UpstreamResult::Image(GeneratedImage { image, caption }));
    }

    if let Some(text) = content_text {
        if let Some(generated) = image_from_content_string(text) {
            return Ok(UpstreamResult::Image(generated));
        }
        if !text.is_empty() {
            return Ok(UpstreamResult::Text(text.to_string()));
        }
    }

    if let Some(parts) = content.and_then(|c| c.as_array()) {
        if let Some(image) = parts.iter().find_map(image_from_part) {
            return Ok(UpstreamResult::Image(GeneratedImage {
                image,
                caption: content.and_then(text_from_parts),
            }));
        }
        if let Some(text) = content.and_then(text_from_parts) {
            return Ok(UpstreamResult::Text(text));
        }
    }

    Err(RelayError::EmptyUpstreamResult)
}

/// Accepts `{type:"image_url", image_url:{url}}`, `{image_url:"..."}` and `{url:"..."}`
fn image_from_part(part: &Value) -> Option<ImageRef> {
    let url = part
        .get("image_url")
        .and_then(|iu| iu.get("url").and_then(|u| u.as_str()).or_else(|| iu.as_str()))
        .or_else(|| part.get("url").and_then(|u| u.as_str()))
        .map(str::trim)
        .filter(|u| !u.is_empty())?;

    if url.starts_with("data:") {
        return inline_image(url);
    }
    Some(ImageRef::Url(url.to_string()))
}

/// Data URL whose payload actually decodes
fn inline_image(value: &str) -> Option<ImageRef> {
    let (mime_type, data) = parse_data_url(value)?;
    decode_base64(&data).ok()?;
    Some(ImageRef::Inline { mime_type, data })
}

/// `content` that is an inline image, optionally followed by text after a space.
///
/// Wrapped payloads only break on newlines, so a space ends the payload.
fn image_from_content_string(text: &str) -> Option<GeneratedImage> {
    if !is_inline_image(text) {
        return None;
    }

    let (head, tail) = text.split_once(' ').unwrap_or((text, ""));
    let image = inline_image(head)?;
    let caption = Some(tail.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    Some(GeneratedImage { image, caption })
}

fn text_from_parts(content: &Value) -> Option<String> {
    let joined = content
        .as_array()?
        .iter()
        .filter(|p| p.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(message: Value) -> Value {
        json!({ "id": "gen-1", "choices": [{ "index": 0, "message": message }] })
    }

    #[test]
    fn test_images_field_wins_over_text() {
        let result = extract_result(&reply(json!({
            "role": "assistant",
            "content": "Here is your cartoon",
            "images": [{ "type": "image_url", "image_url": { "url": "data:image/png;base64,Zm9v" } }]
        })))
        .unwrap();

        assert_eq!(
            result,
            UpstreamResult::Image(GeneratedImage {
                image: ImageRef::Inline { mime_type: "image/png".into(), data: "Zm9v".into() },
                caption: Some("Here is your cartoon".into()),
            })
        );
    }

    #[test]
    fn test_images_field_with_remote_url() {
        let result = extract_result(&reply(json!({
            "content": null,
            "images": [{ "url": "https://cdn.example.com/out.png" }]
        })))
        .unwrap();
        assert_eq!(result.image(), Some(&ImageRef::Url("https://cdn.example.com/out.png".into())));
        assert_eq!(result.text(), None);
    }

    #[test]
    fn test_empty_images_field_falls_through_to_text() {
        let result = extract_result(&reply(json!({
            "content": "only words",
            "images": []
        })))
        .unwrap();
        assert_eq!(result, UpstreamResult::Text("only words".into()));
    }

    #[test]
    fn test_inline_image_content_string() {
        let result = extract_result(&reply(json!({
            "content": "data:image/png;base64,Zm9v"
        })))
        .unwrap();
        assert_eq!(
            result.image(),
            Some(&ImageRef::Inline { mime_type: "image/png".into(), data: "Zm9v".into() })
        );
    }

    #[test]
    fn test_wrapped_inline_image_content_string() {
        for content in ["data:image/png;base64,Zm9v\nYmFy", "data:image/png;base64,Zm9v\r\nYmFy\r\n"] {
            let result = extract_result(&reply(json!({ "content": content }))).unwrap();
            assert_eq!(
                result,
                UpstreamResult::Image(GeneratedImage {
                    image: ImageRef::Inline { mime_type: "image/png".into(), data: "Zm9vYmFy".into() },
                    caption: None,
                })
            );
        }
    }

    #[test]
    fn test_inline_image_followed_by_text() {
        let result = extract_result(&reply(json!({
            "content": "data:image/png;base64,Zm9v Here is your image"
        })))
        .unwrap();
        assert_eq!(
            result,
            UpstreamResult::Image(GeneratedImage {
                image: ImageRef::Inline { mime_type: "image/png".into(), data: "Zm9v".into() },
                caption: Some("Here is your image".into()),
            })
        );
    }

    #[test]
    fn test_undecodable_inline_content_is_text() {
        let result = extract_result(&reply(json!({
            "content": "data:image/png;base64,@@@@ oops"
        })))
        .unwrap();
        assert_eq!(result, UpstreamResult::Text("data:image/png;base64,@@@@ oops".into()));
    }

    #[test]
    fn test_undecodable_images_entry_is_skipped() {
        let result = extract_result(&reply(json!({
            "content": "fallback",
            "images": [
                { "image_url": { "url": "data:image/png;base64,not base64!" } },
                { "image_url": { "url": "data:image/webp;base64,AAAA" } }
            ]
        })))
        .unwrap();
        assert_eq!(
            result.image(),
            Some(&ImageRef::Inline { mime_type: "image/webp".into(), data: "AAAA".into() })
        );
    }

    #[test]
    fn test_content_array_with_image_part() {
        let result = extract_result(&reply(json!({
            "content": [
                { "type": "text", "text": "done" },
                { "type": "image_url", "image_url": { "url": "data:image/webp;base64,AAAA" } }
            ]
        })))
        .unwrap();
        assert_eq!(result.text(), Some("done"));
        assert_eq!(result.image().unwrap().mime_type(), "image/webp");
    }

    #[test]
    fn test_plain_text_content() {
        let result = extract_result(&reply(json!({ "content": "I cannot draw that" }))).unwrap();
        assert_eq!(result, UpstreamResult::Text("I cannot draw that".into()));
    }

    #[test]
    fn test_empty_reply_fails() {
        assert!(matches!(
            extract_result(&reply(json!({ "content": "" }))),
            Err(RelayError::EmptyUpstreamResult)
        ));
        assert!(matches!(
            extract_result(&json!({ "choices": [] })),
            Err(RelayError::EmptyUpstreamResult)
        ));
        assert!(matches!(
            extract_result(&json!({})),
            Err(RelayError::EmptyUpstreamResult)
        ));
    }

    #[test]
    fn test_error_object_in_success_body() {
        let err = extract_result(&json!({
            "error": { "code": 429, "message": "Rate limit exceeded" }
        }))
        .unwrap_err();
        match err {
            RelayError::Upstream { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "Rate limit exceeded");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}

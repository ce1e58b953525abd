// OpenAI 协议响应转换模块
//
// UpstreamResult → chat.completion document. Images ride in the non-standard
// `message.images` array, the same shape the upstream itself uses.

use super::models::*;
use crate::proxy::mappers::models::UpstreamResult;

/// Build the buffered `chat.completion` response.
pub fn transform_openai_response(result: &UpstreamResult, model: &str) -> OpenAIResponse {
    let images = result
        .image()
        .map(|img| vec![OpenAIImagePart::new(img.to_url())]);

    OpenAIResponse {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
        object: "chat.completion".to_string(),
        created: chrono::Utc::now().timestamp() as u64,
        model: model.to_string(),
        choices: vec![Choice {
            index: 0,
            message: OpenAIResponseMessage {
                role: "assistant".to_string(),
                content: result.text().unwrap_or_default().to_string(),
                images,
            },
            finish_reason: Some("stop".to_string()),
        }],
    }
}

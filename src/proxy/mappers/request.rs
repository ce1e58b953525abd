// Request normalizer
//
// Reduces every accepted inbound shape to a `NormalizedRequest`:
// - OpenAI conversation (`messages`, last user turn wins)
// - browser UI (`prompt` + `images`)
// - Gemini `contents` (last user content wins)

use serde_json::Value;
use tracing::debug;

use super::gemini::models::{GeminiContent, GeminiPart, GeminiRequest};
use super::models::{HistoryTurn, ImageRef, NormalizedRequest, TurnRole};
use super::openai::models::{OpenAIContent, OpenAIContentBlock, OpenAIMessage, OpenAIRequest};
use crate::proxy::common::common_utils::{decode_base64, parse_data_url};
use crate::proxy::error::RelayError;

/// MIME type assumed for bare base64 strings in the UI `images` array
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Normalize a `/v1/chat/completions` body (conversation or UI shape).
pub fn normalize_openai(body: Value) -> Result<NormalizedRequest, RelayError> {
    let req: OpenAIRequest = serde_json::from_value(body)
        .map_err(|e| RelayError::InvalidRequest(e.to_string()))?;

    let normalized = if req.messages.is_empty() {
        normalize_ui_shape(&req)?
    } else {
        normalize_conversation(&req)?
    };

    debug!(
        "Normalized OpenAI request: {} image(s), {} history turn(s)",
        normalized.images.len(),
        normalized.history.len()
    );
    Ok(normalized)
}

fn normalize_conversation(req: &OpenAIRequest) -> Result<NormalizedRequest, RelayError> {
    let last_user_idx = req
        .messages
        .iter()
        .rposition(|m| m.role == "user")
        .ok_or(RelayError::MissingPrompt)?;

    let (texts, images) = split_openai_content(&req.messages[last_user_idx])?;
    let prompt = join_texts(&texts).ok_or(RelayError::MissingPrompt)?;

    let history = req.messages[..last_user_idx]
        .iter()
        .filter_map(|m| {
            let role = match m.role.as_str() {
                "user" => TurnRole::User,
                "assistant" => TurnRole::Assistant,
                _ => return None,
            };
            let (texts, _) = split_openai_content(m).ok()?;
            join_texts(&texts).map(|text| HistoryTurn { role, text })
        })
        .collect();

    Ok(NormalizedRequest {
        prompt: annotate_prompt(prompt, images.len()),
        images,
        history,
        model: req.model.clone(),
        stream: req.stream,
    })
}

fn split_openai_content(msg: &OpenAIMessage) -> Result<(Vec<String>, Vec<ImageRef>), RelayError> {
    let mut texts = Vec::new();
    let mut images = Vec::new();

    match &msg.content {
        None => {}
        Some(OpenAIContent::String(s)) => texts.push(s.clone()),
        Some(OpenAIContent::Array(blocks)) => {
            for block in blocks {
                match block {
                    OpenAIContentBlock::Text { text } => texts.push(text.clone()),
                    OpenAIContentBlock::ImageUrl { image_url } => {
                        images.push(parse_image_reference(image_url.url(), false)?)
                    }
                    OpenAIContentBlock::Unsupported => {}
                }
            }
        }
    }

    Ok((texts, images))
}

fn normalize_ui_shape(req: &OpenAIRequest) -> Result<NormalizedRequest, RelayError> {
    let prompt = req
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(RelayError::MissingPrompt)?
        .to_string();

    let images = req
        .images
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_image_reference(s, true))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedRequest {
        prompt: annotate_prompt(prompt, images.len()),
        images,
        history: Vec::new(),
        model: req.model.clone(),
        stream: req.stream,
    })
}

/// Normalize a Gemini `generateContent` body.
pub fn normalize_gemini(
    body: Value,
    model: &str,
    stream: bool,
) -> Result<NormalizedRequest, RelayError> {
    let req: GeminiRequest = serde_json::from_value(body)
        .map_err(|e| RelayError::InvalidRequest(e.to_string()))?;

    let is_user = |c: &GeminiContent| c.role.as_deref().map_or(true, |r| r == "user");
    let last_user_idx = req
        .contents
        .iter()
        .rposition(is_user)
        .ok_or(RelayError::MissingPrompt)?;

    let (texts, images) = split_gemini_parts(&req.contents[last_user_idx].parts)?;
    let prompt = join_texts(&texts).ok_or(RelayError::MissingPrompt)?;

    let history = req.contents[..last_user_idx]
        .iter()
        .filter_map(|c| {
            let role = if is_user(c) {
                TurnRole::User
            } else if c.role.as_deref() == Some("model") {
                TurnRole::Assistant
            } else {
                return None;
            };
            let (texts, _) = split_gemini_parts(&c.parts).ok()?;
            join_texts(&texts).map(|text| HistoryTurn { role, text })
        })
        .collect();

    Ok(NormalizedRequest {
        prompt: annotate_prompt(prompt, images.len()),
        images,
        history,
        model: Some(model.to_string()),
        stream,
    })
}

fn split_gemini_parts(parts: &[GeminiPart]) -> Result<(Vec<String>, Vec<ImageRef>), RelayError> {
    let mut texts = Vec::new();
    let mut images = Vec::new();

    for part in parts {
        if part.thought == Some(true) {
            continue;
        }
        if let Some(text) = &part.text {
            texts.push(text.clone());
        }
        if let Some(inline) = &part.inline_data {
            images.push(inline_image(&inline.mime_type, &inline.data)?);
        }
        if let Some(file) = &part.file_data {
            images.push(parse_image_reference(&file.file_uri, false)?);
        }
    }

    Ok((texts, images))
}

/// Parse one image reference: a data URL, a remote URL, or (when
/// `allow_bare_base64`) a bare base64 payload.
pub fn parse_image_reference(value: &str, allow_bare_base64: bool) -> Result<ImageRef, RelayError> {
    let value = value.trim();

    if let Some((mime, data)) = parse_data_url(value) {
        return inline_image(&mime, &data);
    }
    if value.starts_with("data:") {
        return Err(RelayError::InvalidRequest(format!(
            "Malformed data URL: {}",
            truncate_for_error(value)
        )));
    }

    if let Ok(url) = url::Url::parse(value) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(ImageRef::Url(value.to_string()));
        }
    }

    if allow_bare_base64 {
        return inline_image(DEFAULT_IMAGE_MIME, value);
    }

    Err(RelayError::InvalidRequest(format!(
        "Unsupported image reference: {}",
        truncate_for_error(value)
    )))
}

fn inline_image(mime_type: &str, data: &str) -> Result<ImageRef, RelayError> {
    decode_base64(data).map_err(|e| {
        RelayError::InvalidRequest(format!("Image data is not valid base64: {}", e))
    })?;
    Ok(ImageRef::Inline {
        mime_type: mime_type.to_string(),
        data: data.trim().to_string(),
    })
}

fn join_texts(texts: &[String]) -> Option<String> {
    let joined = texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Tell the upstream model how many images it is looking at when there is more than one.
pub fn annotate_prompt(prompt: String, image_count: usize) -> String {
    if image_count > 1 {
        format!("{}\n\n[{} images attached]", prompt, image_count)
    } else {
        prompt
    }
}

fn truncate_for_error(value: &str) -> String {
    let head: String = value.chars().take(48).collect();
    if head.len() < value.len() {
        format!("{}...", head)
    } else {
        head
    }
}

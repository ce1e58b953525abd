// Protocol-neutral data model shared by the normalizer, the upstream client and the adapters

use crate::proxy::common::common_utils::{build_data_url, guess_image_mime};

/// An image either referenced by URL or carried inline as base64
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    Inline { mime_type: String, data: String },
}

impl ImageRef {
    /// URL form accepted by OpenAI-style `image_url` parts (data URL for inline images)
    pub fn to_url(&self) -> String {
        match self {
            ImageRef::Url(url) => url.clone(),
            ImageRef::Inline { mime_type, data } => build_data_url(mime_type, data),
        }
    }

    pub fn mime_type(&self) -> String {
        match self {
            ImageRef::Url(url) => guess_image_mime(url).to_string(),
            ImageRef::Inline { mime_type, .. } => mime_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// An earlier conversation turn, text only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: TurnRole,
    pub text: String,
}

/// What every inbound shape is reduced to before the upstream call.
///
/// `prompt` is never empty; the normalizer rejects such requests.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub prompt: String,
    pub images: Vec<ImageRef>,
    pub history: Vec<HistoryTurn>,
    /// Model the caller asked for; echoed back, never forwarded
    pub model: Option<String>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub image: ImageRef,
    /// Assistant text that came along with the image
    pub caption: Option<String>,
}

/// Single upstream reply, reduced to exactly one kind of payload
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResult {
    Image(GeneratedImage),
    Text(String),
}

impl UpstreamResult {
    /// Text that accompanies the result (caption for images)
    pub fn text(&self) -> Option<&str> {
        match self {
            UpstreamResult::Image(img) => img.caption.as_deref(),
            UpstreamResult::Text(text) => Some(text.as_str()),
        }
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            UpstreamResult::Image(img) => Some(&img.image),
            UpstreamResult::Text(_) => None,
        }
    }
}

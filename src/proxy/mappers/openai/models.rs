// OpenAI data models

use serde::{Deserialize, Serialize};

/// Inbound body for `/v1/chat/completions`.
///
/// Carries both accepted shapes: the conversation shape (`messages`) and the
/// browser UI shape (`prompt` + `images`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAIRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<OpenAIMessage>,
    #[serde(default)]
    pub stream: bool,
    // UI shape
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OpenAIContent {
    String(String),
    Array(Vec<OpenAIContentBlock>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OpenAIContentBlock {
    #[serde(rename = "text", alias = "input_text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: OpenAIImageUrlField },
    #[serde(other)]
    Unsupported,
}

/// Some clients send `image_url` as a bare string instead of `{ url }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OpenAIImageUrlField {
    Plain(String),
    Object(OpenAIImageUrl),
}

impl OpenAIImageUrlField {
    pub fn url(&self) -> &str {
        match self {
            OpenAIImageUrlField::Plain(url) => url,
            OpenAIImageUrlField::Object(obj) => &obj.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<OpenAIContent>,
}

// ===== Outbound =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: OpenAIResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIResponseMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<OpenAIImagePart>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIImagePart {
    pub r#type: String,
    pub image_url: OpenAIImageUrl,
}

impl OpenAIImagePart {
    pub fn new(url: String) -> Self {
        Self {
            r#type: "image_url".to_string(),
            image_url: OpenAIImageUrl { url, detail: None },
        }
    }
}

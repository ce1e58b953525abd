// Common utilities shared by the normalizer, the upstream client and the adapters

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:(?P<mime>[\w.+-]+/[\w.+-]+)(?:;[\w-]+=[^;,]*)*;base64,(?P<data>.*)$")
        .expect("data URL regex is valid")
});

/// Split a `data:<mime>;base64,<payload>` URL into (mime_type, payload).
///
/// Line-wrapped payloads are accepted; whitespace is removed from the payload.
/// Returns `None` for anything that is not a base64 data URL.
pub fn parse_data_url(value: &str) -> Option<(String, String)> {
    let trimmed = value.trim();
    let caps = DATA_URL_RE.captures(trimmed)?;
    let mime = caps.name("mime")?.as_str().to_string();
    let data: String = caps
        .name("data")?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if data.is_empty() {
        return None;
    }
    Some((mime, data))
}

/// True when the string is an inline base64 image (`data:image/...;base64,...`)
pub fn is_inline_image(value: &str) -> bool {
    parse_data_url(value)
        .map(|(mime, _)| mime.starts_with("image/"))
        .unwrap_or(false)
}

pub fn build_data_url(mime_type: &str, data: &str) -> String {
    format!("data:{};base64,{}", mime_type, data)
}

/// Decode a base64 payload, ignoring embedded whitespace/newlines.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

/// Guess an image MIME type from a URL path extension. Defaults to PNG.
pub fn guess_image_mime(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/png"
    }
}

/// Split text into pieces of at most `max_chars` characters, on char boundaries.
pub fn split_text_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let size = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect()
}

/// Mask an API key for logging
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 8 {
        return "***".to_string();
    }
    let prefix: String = key.chars().take(4).collect();
    let suffix: String = key.chars().skip(count - 4).collect();
    format!("{}***{}", prefix, suffix)
}

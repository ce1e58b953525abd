use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Upstream
// ============================================================================

/// Single upstream image-generation endpoint (OpenAI-compatible chat API)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL without the trailing `/chat/completions`
    pub base_url: String,
    /// Fixed model identifier sent upstream regardless of what the caller asked for
    pub model: String,
    /// Default key used when the caller sends no credentials
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Optional outbound proxy (http/https/socks5)
    pub proxy_url: Option<String>,
    pub user_agent: String,
    /// Forward earlier conversation turns instead of only the last user turn
    pub include_history: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            model: default_upstream_model(),
            api_key: None,
            timeout_secs: 300,
            connect_timeout_secs: 20,
            proxy_url: None,
            user_agent: default_user_agent(),
            include_history: false,
        }
    }
}

fn default_upstream_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_upstream_model() -> String {
    "google/gemini-2.5-flash-image-preview".to_string()
}

fn default_user_agent() -> String {
    format!("imagegen-relay/{}", env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Streaming
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Artificial delay between emitted chunks
    pub chunk_delay_ms: u64,
    /// Maximum characters per text delta
    pub text_chunk_chars: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_delay_ms: 50,
            text_chunk_chars: 64,
        }
    }
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// When set, a daily rolling log file is written here as well
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

// ============================================================================
// RelayConfig
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
    /// Directory with the browser UI; served as fallback when it exists
    pub static_dir: Option<PathBuf>,
    pub log: LogConfig,
    pub upstream: UpstreamConfig,
    pub stream: StreamConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8046,
            max_body_size: 100 * 1024 * 1024,
            static_dir: Some(PathBuf::from("public")),
            log: LogConfig::default(),
            upstream: UpstreamConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

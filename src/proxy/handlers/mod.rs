// Handlers module - API endpoint processors
//
// - POST /v1/chat/completions (OpenAI conversation + browser UI shape)
// - POST /v1beta/models/:model_action (Gemini generate / streamGenerate)
// - GET  /v1/models, /v1beta/models

pub mod common;
pub mod gemini;
pub mod openai;

use std::sync::Arc;

use crate::models::RelayConfig;
use crate::proxy::upstream::client::UpstreamClient;

/// Shared application state for Axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: Arc<RelayConfig>, upstream: Arc<UpstreamClient>) -> Self {
        Self { config, upstream }
    }

    /// Key used when the caller sends none
    pub fn default_api_key(&self) -> Option<&str> {
        self.config.upstream.api_key.as_deref()
    }
}

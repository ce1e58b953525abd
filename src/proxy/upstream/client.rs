// 上游客户端实现
// 基于 reqwest 封装: one synchronous chat-completions call per request

use reqwest::{header, Client};
use serde_json::{json, Value};
use tokio::time::Duration;

use crate::models::UpstreamConfig;
use crate::proxy::common::common_utils::mask_key;
use crate::proxy::common::error_classifier::classify_transport_error;
use crate::proxy::error::RelayError;
use crate::proxy::mappers::result::extract_result;
use crate::proxy::mappers::{NormalizedRequest, UpstreamResult};
use crate::proxy::middleware::auth::Credentials;

/// Output modalities requested from the upstream model
const MODALITIES: [&str; 2] = ["image", "text"];

/// 标准化代理 URL（确保有协议前缀）
pub fn normalize_proxy_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("socks5://")
        || trimmed.starts_with("socks5h://")
    {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

pub struct UpstreamClient {
    client: Client,
    endpoint: String,
    model: String,
    include_history: bool,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, String> {
        let client = Self::build_client(config)
            .map_err(|e| format!("Failed to create upstream HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: Self::build_url(&config.base_url),
            model: config.model.clone(),
            include_history: config.include_history,
        })
    }

    fn build_client(config: &UpstreamConfig) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone());

        if let Some(proxy_url) = config.proxy_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let url = normalize_proxy_url(proxy_url);
            match reqwest::Proxy::all(&url) {
                Ok(proxy) => {
                    builder = builder.proxy(proxy);
                    tracing::info!("UpstreamClient enabled proxy: {}", url);
                }
                Err(e) => tracing::warn!("Ignoring invalid upstream proxy {}: {}", url, e),
            }
        }

        builder.build()
    }

    fn build_url(base_url: &str) -> String {
        let base = base_url.trim().trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the chat-completions payload: optional history, then one user turn
    /// with the text part followed by one `image_url` part per image.
    pub fn build_payload(&self, req: &NormalizedRequest) -> Value {
        let mut messages: Vec<Value> = Vec::new();

        if self.include_history {
            messages.extend(req.history.iter().map(|turn| {
                json!({ "role": turn.role.as_str(), "content": turn.text })
            }));
        }

        let mut content = vec![json!({ "type": "text", "text": req.prompt })];
        content.extend(req.images.iter().map(|img| {
            json!({ "type": "image_url", "image_url": { "url": img.to_url() } })
        }));
        messages.push(json!({ "role": "user", "content": content }));

        json!({
            "model": self.model,
            "messages": messages,
            "modalities": MODALITIES,
            "stream": false
        })
    }

    /// Call the upstream once and reduce its reply to an `UpstreamResult`.
    pub async fn generate(
        &self,
        credentials: &Credentials,
        req: &NormalizedRequest,
    ) -> Result<UpstreamResult, RelayError> {
        let payload = self.build_payload(req);

        tracing::info!(
            "→ Upstream {} | model: {} | images: {} | key: {}",
            self.endpoint,
            self.model,
            req.images.len(),
            mask_key(&credentials.api_key)
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", credentials.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let (error_type, message) = classify_transport_error(&e);
                tracing::error!("Upstream transport error [{}]: {}", error_type, e);
                RelayError::Transport(format!("{} ({})", message, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            tracing::warn!("Upstream returned {}: {}", status, body);
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                status_text,
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::InvalidUpstreamResponse(e.to_string()))?;

        let result = extract_result(&body)?;
        tracing::info!(
            "← Upstream result: {}",
            match &result {
                UpstreamResult::Image(_) => "image",
                UpstreamResult::Text(_) => "text",
            }
        );
        Ok(result)
    }
}

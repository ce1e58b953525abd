// Relay Server - Route assembly, middleware stack, and server lifecycle

use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, error, info};

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};

use crate::models::RelayConfig;
use crate::proxy::handlers::AppState;
use crate::proxy::middleware::{cors_layer, monitor_middleware};
use crate::proxy::upstream::client::UpstreamClient;

// ============================================================================
// Health check handler
// ============================================================================

async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
    .into_response()
}

// ============================================================================
// Route builders
// ============================================================================

/// Build relay routes (OpenAI + Gemini)
fn relay_routes(state: AppState) -> Router {
    use crate::proxy::handlers;

    Router::new()
        // Health checks
        .route("/health", get(health_check_handler))
        .route("/healthz", get(health_check_handler))
        // OpenAI Protocol
        .route("/v1/models", get(handlers::openai::handle_list_models))
        .route("/v1/chat/completions", post(handlers::openai::handle_chat_completions))
        // Gemini Protocol (Native)
        .route("/v1beta/models", get(handlers::gemini::handle_list_models))
        .route("/v1beta/models/:model_action", post(handlers::gemini::handle_generate))
        .route("/v1/models/:model_action", post(handlers::gemini::handle_generate))
        .with_state(state)
}

/// Full application router: relay routes, middleware stack and optional static UI
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let app = relay_routes(state)
        .layer(axum::middleware::from_fn(monitor_middleware))
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(config.max_body_size));

    // Serve the browser UI when its directory exists
    match config.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        Some(dir) => {
            info!("Serving static assets from: {}", dir.display());
            app.fallback_service(
                tower_http::services::ServeDir::new(dir)
                    .fallback(tower_http::services::ServeFile::new(dir.join("index.html"))),
            )
        }
        None => app,
    }
}

// ============================================================================
// AxumServer - Server lifecycle management
// ============================================================================

#[derive(Clone)]
pub struct AxumServer {
    shutdown_tx: Arc<tokio::sync::Mutex<Option<oneshot::Sender<()>>>>,
    pub local_addr: std::net::SocketAddr,
    pub is_running: Arc<RwLock<bool>>,
}

impl AxumServer {
    /// Start the relay server
    pub async fn start(config: RelayConfig) -> Result<(Self, tokio::task::JoinHandle<()>), String> {
        let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);
        info!(
            "Upstream: {} (model: {})",
            upstream.endpoint(),
            upstream.model()
        );

        let addr = format!("{}:{}", config.host, config.port);
        let state = AppState::new(Arc::new(config), upstream);
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read local address: {}", e))?;

        info!("Relay server started at http://{}", local_addr);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx))),
            local_addr,
            is_running: Arc::new(RwLock::new(true)),
        };

        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _remote_addr)) => {
                                let io = TokioIo::new(stream);
                                let hyper_svc = TowerToHyperService::new(app.clone());

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, hyper_svc)
                                        .await
                                    {
                                        debug!("Connection ended: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Accept connection failed: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Relay server shutting down");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    /// Stop the relay server
    pub async fn stop(&self) {
        let mut lock = self.shutdown_tx.lock().await;
        if let Some(tx) = lock.take() {
            let _ = tx.send(());
            *self.is_running.write().await = false;
            info!("Relay server stop signal sent");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

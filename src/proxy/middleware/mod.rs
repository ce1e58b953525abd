// Middleware: credential extraction, request monitoring, CORS

pub mod auth;
pub mod monitor;

pub use auth::{extract_credentials, Credentials};
pub use monitor::monitor_middleware;

use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS so the browser UI can call the relay from any origin
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

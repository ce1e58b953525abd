pub mod config;
pub mod logger;

// Re-export commonly used functions
pub use config::{default_config_path, load_config};
pub use logger::init_logger;

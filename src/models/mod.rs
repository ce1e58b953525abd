pub mod config;

pub use config::{LogConfig, RelayConfig, StreamConfig, UpstreamConfig};

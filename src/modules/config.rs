use std::fs;
use std::path::{Path, PathBuf};

use crate::models::RelayConfig;

const CONFIG_DIR: &str = "imagegen-relay";
const CONFIG_FILE: &str = "config.json";

/// Default config location: `<config_dir>/imagegen-relay/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load relay configuration from disk, then apply `RELAY_*` environment overrides.
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, String> {
    let config_path = path.map(Path::to_path_buf).or_else(default_config_path);

    let mut config = match config_path {
        Some(ref p) if p.exists() => read_config_file(p)?,
        _ => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RelayConfig, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("failed_to_read_config_file: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("failed_to_parse_config_file: {}", e))
}

/// Apply environment overrides. The lookup is injected so tests don't touch process env.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = non_empty("RELAY_HOST") {
        config.host = host;
    }
    if let Some(port) = non_empty("RELAY_PORT") {
        config.port = port
            .parse()
            .map_err(|e| format!("invalid RELAY_PORT '{}': {}", port, e))?;
    }
    if let Some(size) = non_empty("RELAY_MAX_BODY_SIZE") {
        config.max_body_size = size
            .parse()
            .map_err(|e| format!("invalid RELAY_MAX_BODY_SIZE '{}': {}", size, e))?;
    }
    if let Some(dir) = non_empty("RELAY_STATIC_DIR") {
        config.static_dir = Some(PathBuf::from(dir));
    }
    if let Some(url) = non_empty("RELAY_UPSTREAM_URL") {
        config.upstream.base_url = url;
    }
    if let Some(model) = non_empty("RELAY_UPSTREAM_MODEL") {
        config.upstream.model = model;
    }
    if let Some(key) = non_empty("RELAY_API_KEY") {
        config.upstream.api_key = Some(key);
    }
    if let Some(level) = non_empty("RELAY_LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(delay) = non_empty("RELAY_CHUNK_DELAY_MS") {
        config.stream.chunk_delay_ms = delay
            .parse()
            .map_err(|e| format!("invalid RELAY_CHUNK_DELAY_MS '{}': {}", delay, e))?;
    }

    Ok(())
}

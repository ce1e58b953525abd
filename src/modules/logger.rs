use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::models::LogConfig;

const LOG_FILE_PREFIX: &str = "imagegen-relay.log";

// Keeps the file writer alive for the life of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the global tracing subscriber and bridge `log` records into it.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `true` when this
/// call installed the subscriber; later calls are no-ops and return `false`.
pub fn init_logger(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer().with_target(false);

    let file_layer = config.dir.as_ref().and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create log dir {}: {}", dir.display(), e);
            return None;
        }
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Some(fmt::layer().with_ansi(false).with_writer(writer))
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // log → tracing; another logger may already own the `log` facade
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("log bridge not installed: {}", e);
    }

    tracing::debug!("Logger initialized (level: {})", config.level);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the subscriber is process-global.
    #[test]
    fn test_init_logger_installs_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            level: "debug".to_string(),
            dir: Some(dir.path().join("logs")),
        };

        assert!(init_logger(&config));
        assert!(tracing::dispatcher::has_been_set());
        assert!(dir.path().join("logs").exists());

        assert!(!init_logger(&LogConfig::default()));
        tracing::info!("logger test");
    }
}

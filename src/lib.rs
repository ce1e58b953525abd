pub mod models;
pub mod modules;
pub mod proxy;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use tracing::info;

/// `--config <path>` or `--config=<path>`
fn config_path_from_args(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

pub fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = config_path_from_args(&args);

    let config = modules::load_config(config_path.as_deref()).map_err(|e| anyhow!(e))?;
    modules::init_logger(&config.log);

    info!("Imagegen Relay v{} starting", env!("CARGO_PKG_VERSION"));

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(async {
        let (server, handle) = proxy::AxumServer::start(config)
            .await
            .map_err(|e| anyhow!(e))?;

        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl-C, shutting down");

        server.stop().await;
        handle.await.context("Server task panicked")?;
        Ok::<(), anyhow::Error>(())
    })
}

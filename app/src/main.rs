//! Covenant server entrypoint
//!
//! Loads configuration (optionally from the file named by `COVENANT_CONFIG`),
//! initializes logging, and serves the market API.

use anyhow::Context;
use covenant_api::AppState;
use covenant_core::AppConfig;

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("COVENANT_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path))?;
            let config: AppConfig =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;
            Ok(config)
        }
        Err(_) => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("covenant=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let config = load_config()?;
    let port = config.api_port;

    tracing::info!(
        network = %config.chain.network,
        lcd = %config.chain.lcd_url,
        "Starting Covenant server"
    );

    let state = AppState::with_config(config);
    covenant_api::start_server(state, port)
        .await
        .context("API server failed")?;

    Ok(())
}

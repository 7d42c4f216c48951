use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mos_translator::config::Config;
use mos_translator::routes;
use mos_translator::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mos_translator=debug,tower_http=debug")),
        )
        .init();

    // Load configuration - CONFIG_PATH if set, otherwise the usual file names
    let explicit_path = std::env::var("CONFIG_PATH").ok().filter(|p| !p.trim().is_empty());
    let config_paths: Vec<String> = ["conf.json", "conf.yaml", "conf.yml"]
        .iter()
        .map(|p| p.to_string())
        .collect();

    let (config, loaded_path) = Config::load_first(explicit_path.as_deref(), &config_paths)?;
    match loaded_path {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => warn!("No configuration file found, using defaults. Tried: {:?}", config_paths),
    }
    let config = config.with_env_overrides();

    if !config.assistant_config.is_configured() {
        warn!("OPENAI_API_KEY or ASSISTANT_ID is not set; every lookup will answer notFound");
    }
    if config.system_config.cors_allowed_origins.is_empty() {
        info!("No CORS origins configured; allowing any origin without credentials");
    }

    let addr: SocketAddr = format!("{}:{}", config.system_config.host, config.system_config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.system_config.host, config.system_config.port))?;

    let app_state = AppState::new(config)?;
    let app = routes::create_app(app_state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

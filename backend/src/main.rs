mod api;
mod auth;
mod config;
mod db;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::server::ServerError;
use crate::config::{Config, ConfigError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("tracing init failed: {e}");
    }

    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "invalid configuration"))?;
    tracing::info!(?config, "starting RESTaurante backend");

    api::server::start_server(config)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "server stopped"))?;

    Ok(())
}

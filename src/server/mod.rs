//! Fraud Shield Server Module
//!
//! Web front end for batch fraud analysis: upload pages, the scoring
//! endpoint, one-time result downloads and a small JSON API.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::model::ModelConfig;
use crate::store::StoreConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
    pub max_upload_size: usize,
    pub models: ModelConfig,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        // Pages are embedded; the static directory only carries extra assets
        // and may be absent.
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
        Self {
            host: std::env::var("FRAUD_SHIELD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("FRAUD_SHIELD_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            static_dir: Some(static_dir),
            max_upload_size: std::env::var("FRAUD_SHIELD_MAX_UPLOAD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(200 * 1024 * 1024), // 200MB
            models: ModelConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let started = chrono::Utc::now();

    if let Some(ref static_dir) = config.static_dir {
        if !std::path::Path::new(static_dir).exists() {
            warn!(static_dir = %static_dir, "Static directory not found, extra assets will be unavailable");
        }
    }

    let state = Arc::new(AppState::new(config.clone()));
    if state.engine.is_none() {
        warn!("Starting without a model; uploads will be rejected until one is added");
    }
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        %addr,
        max_upload_mb = config.max_upload_size / 1024 / 1024,
        "Fraud Shield server starting"
    );
    info!(url = %format!("http://{}/analyze", addr), "Upload UI ready");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint ready");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(pid = std::process::id(), "Accepting connections (ctrl+c to stop)");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let uptime = chrono::Utc::now().signed_duration_since(started);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received, draining");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_size, 200 * 1024 * 1024);
        assert!(!config.models.search_paths.is_empty());
    }
}

//! Serve command: run the REST API until interrupted.

use crate::api::{self, AdminAuth, AppState};
use crate::catalog::Store;
use crate::config::Config;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

/// Builds the application state from config.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let credentials = config.admin_credentials()?;
    let auth = AdminAuth::new(&credentials).context("Invalid admin credentials")?;

    let store = Store::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database: {}", config.database_url))?;

    Ok(AppState::new(store, auth))
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = build_state(config).await?;
    let app = api::router(state);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

// HTTP server: single-file uploads committed to GitHub.
//
// Configuration comes from the environment; see README.md for the variables.

use anyhow::{Context, Result};
use log::{info, warn};
use repodrop::{AppState, ServerConfig, UploaderConfig, router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server = ServerConfig::from_env().context("invalid server configuration")?;

    let uploader = UploaderConfig::from_env();
    if let Ok(config) = &uploader {
        info!(
            "Uploading to {}/{}@{} (naming: {}, extension: {}, ensure destination: {})",
            config.destination.owner,
            config.destination.repo,
            config.destination.branch,
            config.naming,
            config.extension_source,
            config.ensure_destination
        );
    }

    let state = AppState::from_config(uploader, server.clone());

    let listener = TcpListener::bind(server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

//! HTTP surface: `POST /api/upload` plus the bundled upload page.

mod handlers;
pub mod intake;

use crate::config::{ConfigError, ServerConfig, UploaderConfig};
use crate::error::UploadError;
use crate::github::GitHubError;
use crate::upload::Uploader;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use log::error;
use std::sync::Arc;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// State shared by every request.
///
/// A missing or invalid uploader configuration does not stop the server;
/// it is reported on each upload attempt instead.
#[derive(Clone)]
pub struct AppState {
    uploader: Result<Arc<Uploader>, ConfigError>,
    server: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(uploader: Uploader, server: ServerConfig) -> Self {
        Self {
            uploader: Ok(Arc::new(uploader)),
            server: Arc::new(server),
        }
    }

    #[must_use]
    pub fn misconfigured(error: ConfigError, server: ServerConfig) -> Self {
        Self {
            uploader: Err(error),
            server: Arc::new(server),
        }
    }

    /// Build state from the outcome of configuration loading.
    ///
    /// A configuration the GitHub client cannot be built from is treated
    /// like a missing one.
    pub fn from_config(config: Result<UploaderConfig, ConfigError>, server: ServerConfig) -> Self {
        let uploader = config.and_then(|config| {
            Uploader::new(config).map_err(|e| match e {
                GitHubError::ClientSetup(message) => ConfigError::ClientSetup(message),
                other => ConfigError::ClientSetup(other.to_string()),
            })
        });

        match uploader {
            Ok(uploader) => Self::new(uploader, server),
            Err(error) => {
                error!("{error}; uploads will fail until this is fixed");
                Self::misconfigured(error, server)
            }
        }
    }

    pub(crate) fn uploader(&self) -> Result<Arc<Uploader>, UploadError> {
        self.uploader.clone().map_err(UploadError::from)
    }

    #[must_use]
    pub fn server_config(&self) -> &ServerConfig {
        &self.server
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .server
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(handlers::index))
        .route("/script.js", get(handlers::script))
        .route(
            "/api/upload",
            post(handlers::upload).fallback(handlers::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

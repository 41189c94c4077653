//! Request-level errors and their HTTP rendering.

use crate::config::ConfigError;
use crate::github::GitHubError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

/// Everything that can end an upload request early.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    BadRequest(String),

    #[error("File exceeds the maximum upload size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("GitHub authentication failed: {0}")]
    Auth(String),

    #[error("GitHub destination not found: {0}")]
    NotFound(String),

    #[error("GitHub upload failed: {0}")]
    Upload(String),

    #[error("Malformed multipart body: {0}")]
    Parse(String),

    #[error("Spool file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UploadError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            UploadError::BadRequest(_) | UploadError::Parse(_) => StatusCode::BAD_REQUEST,
            UploadError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Config(_)
            | UploadError::Auth(_)
            | UploadError::NotFound(_)
            | UploadError::Upload(_)
            | UploadError::Io(_)
            | UploadError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GitHubError> for UploadError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::AuthRequired(message) => UploadError::Auth(message),
            GitHubError::NotFound(message) => UploadError::NotFound(message),
            GitHubError::Api(message) | GitHubError::Unprocessable(message) => {
                UploadError::Upload(message)
            }
            other => UploadError::Upload(other.to_string()),
        }
    }
}

impl From<RecvError> for UploadError {
    fn from(err: RecvError) -> Self {
        UploadError::Internal(format!("GitHub task dropped: {err}"))
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Upload failed ({status}): {message}");
        } else {
            warn!("Upload rejected ({status}): {message}");
        }

        (
            status,
            Json(serde_json::json!({ "success": false, "error": message })),
        )
            .into_response()
    }
}

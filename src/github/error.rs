//! GitHub API error types

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

/// Error types for GitHub API operations
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport, decoding or other client-side octocrab failure
    #[error("Octocrab error: {0}")]
    Octocrab(octocrab::Error),

    /// Validation failure (422), e.g. the resource already exists
    #[error("GitHub rejected the request: {0}")]
    Unprocessable(String),

    /// Non-2xx response other than 401/404/422, carrying the remote message
    #[error("GitHub API error: {0}")]
    Api(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Credential rejected (401)
    #[error("Authentication failed: {0}")]
    AuthRequired(String),

    /// Client setup/configuration error
    #[error("Client setup failed: {0}")]
    ClientSetup(String),

    /// The spawned operation went away before reporting a result
    #[error("GitHub task failed: {0}")]
    TaskFailed(String),
}

impl GitHubError {
    /// Whether the remote answered 404 for the requested resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound(_))
    }

    /// Whether the remote answered 422, which create calls use for
    /// "already exists".
    #[must_use]
    pub fn is_unprocessable(&self) -> bool {
        matches!(self, GitHubError::Unprocessable(_))
    }
}

/// Convenience result alias for GitHub operations
pub type GitHubResult<T> = Result<T, GitHubError>;

impl From<octocrab::Error> for GitHubError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let source = *source;
                match source.status_code.as_u16() {
                    401 => GitHubError::AuthRequired(source.message),
                    404 => GitHubError::NotFound(source.message),
                    422 => GitHubError::Unprocessable(source.message),
                    status => GitHubError::Api(format!("{} (status {status})", source.message)),
                }
            }
            other => GitHubError::Octocrab(other),
        }
    }
}

impl From<RecvError> for GitHubError {
    fn from(err: RecvError) -> Self {
        GitHubError::TaskFailed(err.to_string())
    }
}

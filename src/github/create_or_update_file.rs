//! GitHub File creation/update operation.

use crate::github::{error::GitHubError, util::spawn_task};
use crate::runtime::AsyncTask;
use bytes::Bytes;
use octocrab::{Octocrab, models::repos::FileUpdate};
use std::sync::Arc;

/// Request parameters for creating or updating a file
#[derive(Debug, Clone)]
pub struct CreateOrUpdateFileRequest {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Path to the file in the repository
    pub path: String,
    /// Commit message
    pub message: String,
    /// Raw file content; octocrab base64-encodes it on the wire
    pub content: Bytes,
    /// Branch to commit to (defaults to repository default branch)
    pub branch: Option<String>,
    /// SHA of the file being updated (required for updates, omit for creates)
    pub sha: Option<String>,
}

/// Create **or** update a single file.
pub(crate) fn create_or_update_file(
    inner: Arc<Octocrab>,
    request: CreateOrUpdateFileRequest,
) -> AsyncTask<Result<FileUpdate, GitHubError>> {
    spawn_task(async move {
        if request.path.is_empty() || request.path.starts_with('/') {
            return Err(GitHubError::InvalidInput(format!(
                "invalid repository path {:?}",
                request.path
            )));
        }

        let handler = inner.repos(&request.owner, &request.repo);
        let mut builder = if let Some(existing_sha) = request.sha {
            handler.update_file(&request.path, &request.message, &request.content, existing_sha)
        } else {
            handler.create_file(&request.path, &request.message, &request.content)
        };

        if let Some(b) = request.branch {
            builder = builder.branch(b);
        }

        builder.send().await.map_err(GitHubError::from)
    })
}

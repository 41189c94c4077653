//! GitHub repository lookup operation.

use crate::github::{error::GitHubError, util::spawn_task};
use crate::runtime::AsyncTask;
use octocrab::{Octocrab, models::Repository};
use std::sync::Arc;

/// Fetch a repository; a missing one surfaces as [`GitHubError::NotFound`].
pub(crate) fn get_repository(
    inner: Arc<Octocrab>,
    owner: impl Into<String>,
    repo: impl Into<String>,
) -> AsyncTask<Result<Repository, GitHubError>> {
    let (owner, repo) = (owner.into(), repo.into());
    spawn_task(async move {
        inner
            .repos(&owner, &repo)
            .get()
            .await
            .map_err(GitHubError::from)
    })
}

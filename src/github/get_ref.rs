//! GitHub branch reference lookup operation.

use crate::github::{error::GitHubError, util::spawn_task};
use crate::runtime::AsyncTask;
use octocrab::{Octocrab, models::repos::Ref, params::repos::Reference};
use std::sync::Arc;

/// Resolve `refs/heads/{branch}` to the object it points at.
///
/// # Notes
/// - The branch name should not include the "refs/heads/" prefix
/// - Uses the single-ref endpoint, so a prefix match never counts as found
pub(crate) fn get_branch_ref(
    inner: Arc<Octocrab>,
    owner: impl Into<String>,
    repo: impl Into<String>,
    branch: impl Into<String>,
) -> AsyncTask<Result<Ref, GitHubError>> {
    let (owner, repo, branch) = (owner.into(), repo.into(), branch.into());
    spawn_task(async move {
        inner
            .repos(&owner, &repo)
            .get_ref(&Reference::Branch(branch))
            .await
            .map_err(GitHubError::from)
    })
}

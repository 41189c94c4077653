//! Idempotent provisioning of an upload destination.
//!
//! Makes sure a repository and a branch exist before anything is written to
//! them. Each resource is probed first and only created on a 404; every other
//! failure aborts. A 422 from a create call means another request created the
//! resource in the meantime and counts as success.

use crate::github::GitHubClient;
use crate::github::error::{GitHubError, GitHubResult};
use log::{debug, info, warn};
use octocrab::models::Repository;
use octocrab::models::repos::{Object, Ref};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

const MAX_POLL_DELAY: Duration = Duration::from_secs(4);

/// Tuning for [`ensure_destination`].
#[derive(Debug, Clone)]
pub struct EnsureOptions {
    /// Branches tried in order when a new branch needs a starting commit
    pub base_branches: Vec<String>,
    /// Total number of readiness probes after creating a repository
    pub poll_attempts: usize,
    /// Delay before the first retry; later delays double up to a cap
    pub poll_delay: Duration,
    /// Description given to repositories created on demand
    pub repo_description: String,
}

impl Default for EnsureOptions {
    fn default() -> Self {
        Self {
            base_branches: vec!["main".to_string(), "master".to_string()],
            poll_attempts: 6,
            poll_delay: Duration::from_millis(250),
            repo_description: "Storage for web uploads".to_string(),
        }
    }
}

/// What [`ensure_destination`] had to create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnsureOutcome {
    pub repository_created: bool,
    pub branch_created: bool,
}

/// Guarantee that `owner/repo` and its `branch` exist.
///
/// Existing resources are left untouched, so calling this repeatedly is safe.
pub async fn ensure_destination(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    branch: &str,
    options: &EnsureOptions,
) -> GitHubResult<EnsureOutcome> {
    let repository_created = ensure_repository(client, owner, repo, options).await?;
    let branch_created = ensure_branch(client, owner, repo, branch, options).await?;

    Ok(EnsureOutcome {
        repository_created,
        branch_created,
    })
}

async fn ensure_repository(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    options: &EnsureOptions,
) -> GitHubResult<bool> {
    match client.get_repository(owner, repo).await? {
        Ok(_) => {
            debug!("Repository {owner}/{repo} exists");
            return Ok(false);
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    info!("Repository {owner}/{repo} not found, creating it");
    let created = match client
        .create_repository(
            repo,
            Some(options.repo_description.clone()),
            Some(false),
            Some(true),
        )
        .await?
    {
        Ok(_) => true,
        Err(e) if e.is_unprocessable() => {
            warn!("Repository {owner}/{repo} was created concurrently: {e}");
            false
        }
        Err(e) => return Err(e),
    };

    wait_until_ready(client, owner, repo, options).await?;
    Ok(created)
}

/// Poll a freshly created repository until the API serves it.
async fn wait_until_ready(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    options: &EnsureOptions,
) -> GitHubResult<Repository> {
    // tokio-retry computes base^n * factor, so base 2 doubles each step.
    let factor = (options.poll_delay.as_millis() / 2).max(1) as u64;
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(factor)
        .max_delay(MAX_POLL_DELAY)
        .take(options.poll_attempts.saturating_sub(1));

    RetryIf::spawn(
        strategy,
        || async move {
            client
                .get_repository(owner, repo)
                .await
                .unwrap_or_else(|e| Err(GitHubError::from(e)))
        },
        |e: &GitHubError| {
            if e.is_not_found() {
                debug!("Repository {owner}/{repo} not ready yet");
            }
            e.is_not_found()
        },
    )
    .await
    .map_err(|e| match e {
        GitHubError::NotFound(_) => {
            warn!("Repository {owner}/{repo} still missing after creation");
            GitHubError::NotFound(format!(
                "repository {owner}/{repo} was created but did not become available after {} attempts",
                options.poll_attempts.max(1)
            ))
        }
        other => other,
    })
}

async fn ensure_branch(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    branch: &str,
    options: &EnsureOptions,
) -> GitHubResult<bool> {
    if branch_exists(client, owner, repo, branch).await? {
        debug!("Branch {branch} exists in {owner}/{repo}");
        return Ok(false);
    }

    let sha = resolve_base_sha(client, owner, repo, &options.base_branches).await?;
    info!("Creating branch {branch} in {owner}/{repo} at {sha}");
    match client.create_branch(owner, repo, branch, sha).await? {
        Ok(_) => Ok(true),
        Err(e) if e.is_unprocessable() => {
            if branch_exists(client, owner, repo, branch).await? {
                warn!("Branch {branch} in {owner}/{repo} was created concurrently: {e}");
                Ok(false)
            } else {
                Err(e)
            }
        }
        Err(e) => Err(e),
    }
}

async fn branch_exists(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    branch: &str,
) -> GitHubResult<bool> {
    match client.get_branch_ref(owner, repo, branch).await? {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// First existing branch out of `candidates` wins.
async fn resolve_base_sha(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    candidates: &[String],
) -> GitHubResult<String> {
    for candidate in candidates {
        match client.get_branch_ref(owner, repo, candidate.as_str()).await? {
            Ok(reference) => return target_sha(&reference),
            Err(e) if e.is_not_found() => {
                debug!("Base branch {candidate} not found in {owner}/{repo}");
            }
            Err(e) => return Err(e),
        }
    }

    Err(GitHubError::NotFound(format!(
        "no base branch to fork from in {owner}/{repo} (tried: {})",
        candidates.join(", ")
    )))
}

fn target_sha(reference: &Ref) -> GitHubResult<String> {
    match &reference.object {
        Object::Commit { sha, .. } | Object::Tag { sha, .. } => Ok(sha.clone()),
        _ => Err(GitHubError::Api(format!(
            "{} points at an unsupported object",
            reference.ref_field
        ))),
    }
}

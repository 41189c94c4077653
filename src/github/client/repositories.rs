//! Repositories API methods

use super::GitHubClient;
use crate::github::error::GitHubError;
use crate::runtime::AsyncTask;
use octocrab::models::Repository;
use octocrab::models::repos::{FileUpdate, Ref};

impl GitHubClient {
    /// Get a repository
    pub fn get_repository(
        &self,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> AsyncTask<Result<Repository, GitHubError>> {
        crate::github::get_repository::get_repository(self.inner.clone(), owner, repo)
    }

    /// Create a repository for the authenticated user
    pub fn create_repository(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        private: Option<bool>,
        auto_init: Option<bool>,
    ) -> AsyncTask<Result<Repository, GitHubError>> {
        crate::github::create_repository::create_repository(
            self.inner.clone(),
            name,
            description,
            private,
            auto_init,
        )
    }

    /// Resolve the head reference of a branch
    pub fn get_branch_ref(
        &self,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> AsyncTask<Result<Ref, GitHubError>> {
        crate::github::get_ref::get_branch_ref(self.inner.clone(), owner, repo, branch)
    }

    /// Create a branch
    pub fn create_branch(
        &self,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch_name: impl Into<String>,
        sha: impl Into<String>,
    ) -> AsyncTask<Result<Ref, GitHubError>> {
        crate::github::create_branch::create_branch(
            self.inner.clone(),
            owner,
            repo,
            branch_name,
            sha,
        )
    }

    /// Create or update a file
    #[must_use]
    pub fn create_or_update_file(
        &self,
        request: crate::github::CreateOrUpdateFileRequest,
    ) -> AsyncTask<Result<FileUpdate, GitHubError>> {
        crate::github::create_or_update_file::create_or_update_file(self.inner.clone(), request)
    }
}

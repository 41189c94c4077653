//! GitHub API operations module
//!
//! Provides the repository operations the uploader relies on, using the
//! octocrab library, plus the destination ensurer built on top of them.

pub mod client;
pub mod ensure;
pub mod error;
pub mod util;

// Re-export client types
pub use client::{GitHubClient, GitHubClientBuilder};

// Re-export error types
pub use error::{GitHubError, GitHubResult};
pub use util::spawn_task;

// Re-export options types
pub use create_or_update_file::CreateOrUpdateFileRequest;
pub use ensure::{EnsureOptions, EnsureOutcome, ensure_destination};

// GitHub API operations - Repositories (internal)
pub(crate) mod create_branch;
pub(crate) mod create_or_update_file;
pub(crate) mod create_repository;
pub(crate) mod get_ref;
pub(crate) mod get_repository;

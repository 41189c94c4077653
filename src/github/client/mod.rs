//! GitHub API client wrapper
//!
//! Provides the handful of repository operations the uploader needs without
//! exposing Octocrab to the rest of the crate.
//!
//! # Examples
//!
//! ```rust,no_run
//! use repodrop::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gh = GitHubClient::with_token("ghp_...")?;
//!
//!     let repo = gh.get_repository("owner", "repo").await??;
//!     println!("{:?}", repo.full_name);
//!
//!     Ok(())
//! }
//! ```

use crate::github::error::{GitHubError, GitHubResult};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use std::sync::{Arc, Once};
use std::time::Duration;

mod repositories;

static CRYPTO_PROVIDER: Once = Once::new();

/// GitHub API client wrapper that encapsulates Octocrab.
///
/// Cloning is cheap (Arc clone).
#[derive(Clone, Debug)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
}

impl GitHubClient {
    /// Create a new client builder
    #[must_use]
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Convenience: create client with personal access token
    pub fn with_token(token: impl Into<String>) -> GitHubResult<Self> {
        Self::builder().personal_token(token).build()
    }
}

/// Builder for creating `GitHubClient`
pub struct GitHubClientBuilder {
    token: Option<String>,
    base_uri: Option<String>,
    timeout: Option<Duration>,
}

impl GitHubClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: None,
            base_uri: None,
            timeout: None,
        }
    }

    /// Set personal access token for authentication
    pub fn personal_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set base URI (for GitHub Enterprise or a local mock)
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    /// Bound connect, read and write time of every request
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the `GitHubClient`
    ///
    /// Octocrab's retry middleware is switched off: every operation is
    /// attempted exactly once and failures surface to the caller.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        CRYPTO_PROVIDER.call_once(|| {
            // Another component may already have installed one.
            let _ = rustls::crypto::ring::default_provider().install_default();
        });

        let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);

        if let Some(token) = self.token {
            builder = builder.personal_token(token);
        }

        if let Some(timeout) = self.timeout {
            builder = builder
                .set_connect_timeout(Some(timeout))
                .set_read_timeout(Some(timeout))
                .set_write_timeout(Some(timeout));
        }

        if let Some(uri) = self.base_uri {
            builder = builder
                .base_uri(&uri)
                .map_err(|e| GitHubError::ClientSetup(format!("Invalid base URI {uri}: {e}")))?;
        }

        let octocrab = builder
            .build()
            .map_err(|e| GitHubError::ClientSetup(e.to_string()))?;

        Ok(GitHubClient {
            inner: Arc::new(octocrab),
        })
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

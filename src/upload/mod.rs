//! The upload workflow: ensure the destination, write the blob, build the link.

pub mod locator;
pub mod naming;
pub(crate) mod writer;

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::github::{GitHubClient, GitHubResult, ensure_destination};
use bytes::Bytes;
use log::info;

/// One uploaded file, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Bytes,
    /// Name supplied by the client; untrusted
    pub filename: Option<String>,
}

/// A blob committed to the destination repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Repository path, always under `uploads/`
    pub path: String,
    /// Commit that added the blob, when GitHub reports one
    pub commit_sha: Option<String>,
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub object: StoredObject,
    pub url: String,
    pub filename: Option<String>,
}

/// Shared, read-only upload service.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: GitHubClient,
    config: UploaderConfig,
}

impl Uploader {
    /// Build the GitHub client described by `config`.
    pub fn new(config: UploaderConfig) -> GitHubResult<Self> {
        let client = GitHubClient::builder()
            .personal_token(config.destination.token())
            .base_uri(config.api_url.clone())
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self::with_client(client, config))
    }

    #[must_use]
    pub fn with_client(client: GitHubClient, config: UploaderConfig) -> Self {
        Self { client, config }
    }

    /// Store `request` and return its public link.
    ///
    /// The link is only produced once the contents call has succeeded.
    pub async fn upload(&self, request: UploadRequest) -> Result<StoredUpload, UploadError> {
        if request.bytes.is_empty() {
            return Err(UploadError::BadRequest("Uploaded file is empty".to_string()));
        }

        let destination = &self.config.destination;

        if self.config.ensure_destination {
            let outcome = ensure_destination(
                &self.client,
                &destination.owner,
                &destination.repo,
                &destination.branch,
                &self.config.ensure,
            )
            .await?;

            if outcome.repository_created || outcome.branch_created {
                info!(
                    "Provisioned {}/{}@{} (repository created: {}, branch created: {})",
                    destination.owner,
                    destination.repo,
                    destination.branch,
                    outcome.repository_created,
                    outcome.branch_created
                );
            }
        }

        let object = writer::write_blob(&self.client, &self.config, &request).await?;
        let url = locator::locate(&self.config.raw_url, destination, &object.path);

        info!(
            "Stored {} ({} bytes) as {}",
            request.filename.as_deref().unwrap_or("<unnamed>"),
            request.bytes.len(),
            object.path
        );

        Ok(StoredUpload {
            object,
            url,
            filename: request.filename,
        })
    }
}

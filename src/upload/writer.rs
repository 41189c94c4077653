//! Blob writer: names an upload and commits it in a single contents call.

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::github::{CreateOrUpdateFileRequest, GitHubClient};
use crate::upload::naming::{self, NameParts};
use crate::upload::{StoredObject, UploadRequest};
use chrono::Utc;
use log::debug;

/// Commit `request` under a freshly generated path.
///
/// The path never existed before, so the contents call is sent without a
/// `sha` and acts as a create.
pub(crate) async fn write_blob(
    client: &GitHubClient,
    config: &UploaderConfig,
    request: &UploadRequest,
) -> Result<StoredObject, UploadError> {
    let original = request.filename.as_deref();
    let extension = naming::resolve_extension(config.extension_source, original, &request.bytes);
    let token = naming::random_token();
    let name = naming::object_name(
        config.naming,
        NameParts {
            original,
            extension: &extension,
            timestamp_ms: Utc::now().timestamp_millis(),
            token: &token,
        },
    );
    let path = naming::object_path(&name);

    debug!(
        "Writing {} bytes to {}/{}@{}:{path}",
        request.bytes.len(),
        config.destination.owner,
        config.destination.repo,
        config.destination.branch
    );

    let commit = client
        .create_or_update_file(CreateOrUpdateFileRequest {
            owner: config.destination.owner.clone(),
            repo: config.destination.repo.clone(),
            path: path.clone(),
            message: format!("Upload {}", original.unwrap_or(&name)),
            content: request.bytes.clone(),
            branch: Some(config.destination.branch.clone()),
            sha: None,
        })
        .await??;

    Ok(StoredObject {
        path,
        commit_sha: commit.commit.sha,
    })
}

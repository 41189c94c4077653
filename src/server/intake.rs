//! Upload intake: pull the `file` field out of a multipart body.
//!
//! The field is streamed through a spool file in the configured directory
//! and read back into memory. The spool file is removed once the bytes are
//! captured; dropping its `TempPath` removes it on every early return too.

use crate::config::ServerConfig;
use crate::error::UploadError;
use crate::upload::UploadRequest;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use log::{debug, warn};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Read the first `file` field of `multipart` into an [`UploadRequest`].
///
/// Other fields are skipped.
pub async fn read_upload(
    mut multipart: Multipart,
    config: &ServerConfig,
) -> Result<UploadRequest, UploadError> {
    let limit = config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty());
        let bytes = spool_field(field, config).await?;

        if bytes.is_empty() {
            return Err(UploadError::BadRequest("Uploaded file is empty".to_string()));
        }

        return Ok(UploadRequest { bytes, filename });
    }

    Err(UploadError::BadRequest("No file uploaded".to_string()))
}

async fn spool_field(mut field: Field<'_>, config: &ServerConfig) -> Result<Bytes, UploadError> {
    let limit = config.max_upload_bytes;
    let spool = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(&config.spool_dir)?;
    let (file, spool_path) = spool.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut total = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        total += chunk.len();
        if total > limit {
            warn!("Upload exceeded {limit} bytes, aborting");
            return Err(UploadError::PayloadTooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.rewind().await?;

    let mut buffer = Vec::with_capacity(total);
    file.read_to_end(&mut buffer).await?;
    drop(file);

    spool_path.close()?;
    debug!("Captured {total} bytes from spool file");

    Ok(Bytes::from(buffer))
}

fn multipart_error(err: MultipartError, limit: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::PayloadTooLarge { limit }
    } else {
        UploadError::Parse(err.body_text())
    }
}

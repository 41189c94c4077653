//! `repodrop` - commit uploaded files to a GitHub repository
//!
//! Accepts a single file over HTTP, stores it as a base64-encoded blob under
//! `uploads/` in a configured repository and branch via the GitHub contents
//! API, and answers with a raw-content link. The destination repository and
//! branch can be provisioned on demand.

// Module declarations
pub mod config;
pub mod error;
pub mod github;
pub mod runtime;
pub mod server;
pub mod upload;

// Re-export runtime types
pub use runtime::AsyncTask;

// Re-export GitHub client types
pub use github::{GitHubClient, GitHubClientBuilder};

// Re-export GitHub error types
pub use github::{GitHubError, GitHubResult};

// Re-export GitHub operation options
pub use github::{CreateOrUpdateFileRequest, EnsureOptions, EnsureOutcome, ensure_destination};

// Re-export configuration and the upload workflow
pub use config::{ConfigError, DestinationConfig, ServerConfig, UploaderConfig};
pub use error::UploadError;
pub use server::{AppState, router};
pub use upload::naming::{ExtensionSource, NamingStrategy};
pub use upload::{StoredObject, StoredUpload, UploadRequest, Uploader};

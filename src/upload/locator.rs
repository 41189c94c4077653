//! Public raw-content links for stored objects.

use crate::config::DestinationConfig;

/// Raw-content URL for `path` on `owner/repo@branch`.
///
/// Pure string assembly; `raw_base` may carry a trailing slash.
#[must_use]
pub fn raw_url(raw_base: &str, owner: &str, repo: &str, branch: &str, path: &str) -> String {
    format!(
        "{}/{owner}/{repo}/{branch}/{}",
        raw_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// [`raw_url`] for a configured destination.
#[must_use]
pub fn locate(raw_base: &str, destination: &DestinationConfig, path: &str) -> String {
    raw_url(
        raw_base,
        &destination.owner,
        &destination.repo,
        &destination.branch,
        path,
    )
}

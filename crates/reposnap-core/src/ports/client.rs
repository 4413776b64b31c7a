//! Remote repository access port.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::entry::TreeEntry;
use crate::repo::RepoSpec;

/// Errors surfaced by a [`RepoClient`].
///
/// `RateLimited` is only nominally an error: the engine treats it as the
/// signal to switch into archive-fallback mode.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The listing API signalled that the caller exceeded its request quota.
    #[error("rate limited by listing API at {url}")]
    RateLimited {
        /// The URL that was rate limited.
        url: String,
    },

    /// A request came back with an unexpected status.
    #[error("{url} returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The URL that was requested.
        url: String,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request never produced a usable response.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Transport-level description.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("invalid response from {url}: {message}")]
    InvalidResponse {
        /// The URL that was requested.
        url: String,
        /// What was wrong with the body.
        message: String,
    },

    /// Writing a downloaded body to disk failed.
    #[error("failed writing download to {path}: {source}")]
    Io {
        /// Local path being written.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// Port for the remote source-repository API.
///
/// One implementation talks to GitHub over HTTP; tests substitute fakes that
/// serve a fixed tree or simulate rate limiting.
#[async_trait]
pub trait RepoClient: Send + Sync {
    /// List the immediate children of `path` (empty string = repository root)
    /// at the spec's revision.
    async fn list_dir(&self, spec: &RepoSpec, path: &str) -> Result<Vec<TreeEntry>, ClientError>;

    /// Fetch the exact bytes of one file at the spec's revision.
    async fn fetch_raw(&self, spec: &RepoSpec, path: &str) -> Result<Vec<u8>, ClientError>;

    /// Download the whole-repository archive to `dest`.
    async fn download_archive(&self, spec: &RepoSpec, dest: &Path) -> Result<(), ClientError>;

    /// The archive URL for `spec`, as reported in the fallback notification.
    fn archive_url(&self, spec: &RepoSpec) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = ClientError::Status {
            status: 500,
            url: "https://api.example/x".to_string(),
            body: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));

        let err = ClientError::RateLimited {
            url: "https://api.example/x".to_string(),
        };
        assert!(err.to_string().contains("rate limited"));
    }
}

//! Reqwest-backed implementation of the `RepoClient` port.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use reposnap_core::{ClientError, RepoClient, RepoSpec, TreeEntry};

use crate::config::GithubConfig;
use crate::models::ContentsEntry;
use crate::url::{archive_url, contents_url, raw_url};

/// Errors constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The underlying HTTP client could not be initialized.
    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured base URL is opaque and cannot carry path segments.
    #[error("base URL '{0}' cannot be extended with path segments")]
    OpaqueBaseUrl(Url),
}

/// GitHub client talking to the contents API, the raw host, and the
/// archive host.
pub struct GithubClient {
    client: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a client from a configuration.
    ///
    /// Rejects base URLs that cannot carry path segments (`mailto:`-style
    /// opaque URLs), so every URL built later is well formed.
    pub fn new(config: GithubConfig) -> Result<Self, ClientBuildError> {
        for base in [&config.api_base, &config.raw_base, &config.archive_base] {
            if base.cannot_be_a_base() {
                return Err(ClientBuildError::OpaqueBaseUrl(base.clone()));
            }
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a request with the headers GitHub requires.
    fn get(&self, url: &Url) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url.as_str())
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(ref token) = self.config.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        request
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, ClientError> {
        self.get(url).send().await.map_err(|e| ClientError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Turn a non-success response into a `Status` error carrying the body.
    async fn status_error(url: &Url, response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ClientError::Status {
            status,
            url: url.to_string(),
            body,
        }
    }
}

#[async_trait]
impl RepoClient for GithubClient {
    async fn list_dir(&self, spec: &RepoSpec, path: &str) -> Result<Vec<TreeEntry>, ClientError> {
        let url = contents_url(&self.config, spec, path);
        debug!(%url, "listing directory");
        let response = self.send(&url).await?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            // Quota exhausted. Not an error: the engine switches to the
            // archive fallback on this signal.
            return Err(ClientError::RateLimited {
                url: url.to_string(),
            });
        }
        if status != reqwest::StatusCode::OK {
            return Err(Self::status_error(&url, response).await);
        }

        let entries: Vec<ContentsEntry> =
            response.json().await.map_err(|e| ClientError::InvalidResponse {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    async fn fetch_raw(&self, spec: &RepoSpec, path: &str) -> Result<Vec<u8>, ClientError> {
        let url = raw_url(&self.config, spec, path);
        debug!(%url, "fetching raw content");
        let response = self.send(&url).await?;

        if !response.status().is_success() {
            return Err(Self::status_error(&url, response).await);
        }

        let bytes = response.bytes().await.map_err(|e| ClientError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn download_archive(&self, spec: &RepoSpec, dest: &Path) -> Result<(), ClientError> {
        let url = archive_url(&self.config, spec);
        debug!(%url, dest = %dest.display(), "downloading archive");
        let response = self.send(&url).await?;

        if !response.status().is_success() {
            return Err(Self::status_error(&url, response).await);
        }

        // Stream to disk; repository archives can be large.
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| ClientError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ClientError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            file.write_all(&chunk).await.map_err(|e| ClientError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
        }
        file.flush().await.map_err(|e| ClientError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    fn archive_url(&self, spec: &RepoSpec) -> String {
        archive_url(&self.config, spec).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_default_config() {
        let client = GithubClient::new(GithubConfig::default()).unwrap();
        let spec = RepoSpec::new("o", "r", None);
        assert_eq!(
            client.archive_url(&spec),
            "https://codeload.github.com/o/r/zip/master"
        );
    }

    #[test]
    fn rejects_opaque_base_url() {
        let config = GithubConfig::new()
            .with_api_base(Url::parse("mailto:owner@example.com").unwrap());
        assert!(matches!(
            GithubClient::new(config),
            Err(ClientBuildError::OpaqueBaseUrl(_))
        ));
    }
}

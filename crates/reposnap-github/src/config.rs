//! Client configuration.

use std::time::Duration;

use url::Url;

/// Configuration for the GitHub client.
///
/// Use the builder pattern methods to customize the configuration.
///
/// # Example
///
/// ```
/// use reposnap_github::GithubConfig;
/// use std::time::Duration;
///
/// let config = GithubConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_token("ghp_example");
/// ```
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Base URL of the listing API host.
    pub(crate) api_base: Url,
    /// Base URL of the raw file content host.
    pub(crate) raw_base: Url,
    /// Base URL of the archive download host.
    pub(crate) archive_base: Url,
    /// User agent string for HTTP requests; the GitHub API rejects
    /// requests without one.
    pub(crate) user_agent: String,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Optional authentication token for private repositories.
    pub(crate) token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse("https://api.github.com").expect("static URL parses"),
            raw_base: Url::parse("https://raw.githubusercontent.com").expect("static URL parses"),
            archive_base: Url::parse("https://codeload.github.com").expect("static URL parses"),
            user_agent: concat!("reposnap/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

impl GithubConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the listing API host. Defaults to `https://api.github.com`.
    #[must_use]
    pub fn with_api_base(mut self, base: Url) -> Self {
        self.api_base = base;
        self
    }

    /// Override the raw-content host. Defaults to
    /// `https://raw.githubusercontent.com`.
    #[must_use]
    pub fn with_raw_base(mut self, base: Url) -> Self {
        self.raw_base = base;
        self
    }

    /// Override the archive host. Defaults to `https://codeload.github.com`.
    #[must_use]
    pub fn with_archive_base(mut self, base: Url) -> Self {
        self.archive_base = base;
        self
    }

    /// Set the request timeout. Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an authentication token, sent as a bearer header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

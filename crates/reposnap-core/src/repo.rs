//! Repository identification.
//!
//! A job targets one `{owner, repository, revision}` triple. The string form
//! accepted by [`RepoSpec::parse`] covers the inputs users actually paste:
//! `owner/repo`, full `https://github.com/owner/repo(.git)` URLs, ssh-style
//! `git@host:owner/repo`, each optionally suffixed with `#revision`.

use thiserror::Error;

/// Revision used when the caller does not name one.
pub const DEFAULT_REF: &str = "master";

/// Error returned when a repository identifier cannot be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRepoSpec {
    /// The input did not contain an owner and a repository name.
    #[error("'{input}' does not identify an owner and a repository")]
    MissingSegments {
        /// The rejected input.
        input: String,
    },
}

/// The repository a job materializes: owner, name, and revision reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Revision reference: branch, tag, or commit SHA.
    pub git_ref: String,
}

impl RepoSpec {
    /// Build a spec from its parts. A `None` revision falls back to
    /// [`DEFAULT_REF`].
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: Option<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.unwrap_or_else(|| DEFAULT_REF.to_string()),
        }
    }

    /// Parse a repository identifier string, optionally suffixed `#revision`.
    ///
    /// Validation happens here, before any network or filesystem work starts;
    /// a malformed identifier never becomes a running job.
    pub fn parse(input: &str) -> Result<Self, InvalidRepoSpec> {
        let (repo_part, git_ref) = match input.split_once('#') {
            Some((left, right)) if !right.is_empty() => (left, Some(right.to_string())),
            Some((left, _)) => (left, None),
            None => (input, None),
        };

        let trimmed = repo_part
            .trim()
            .trim_end_matches('/')
            .trim_end_matches(".git");

        // Strip scheme ("https://", "git://", ...) if present, then treat the
        // remainder as slash-separated segments. Ssh-style remotes separate
        // host and path with ':'.
        let without_scheme = match trimmed.find("://") {
            Some(idx) => &trimmed[idx + 3..],
            None => trimmed,
        };
        let path_like = without_scheme.replace(':', "/");

        let segments: Vec<&str> = path_like.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(InvalidRepoSpec::MissingSegments {
                input: input.to_string(),
            });
        }

        // Last two segments are owner and repository, matching how git
        // remotes and browser URLs both end.
        let owner = segments[segments.len() - 2];
        let repo = segments[segments.len() - 1];

        Ok(Self::new(owner, repo, git_ref))
    }

    /// Canonical `owner/repo` form.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// The folder name a GitHub archive of this spec expands into.
    #[must_use]
    pub fn archive_root(&self) -> String {
        format!("{}-{}", self.repo, self.git_ref)
    }
}

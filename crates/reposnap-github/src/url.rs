//! URL construction helpers.
//!
//! Pure functions building the three GitHub endpoints the client talks to,
//! so every call site constructs them the same way.

use reposnap_core::RepoSpec;
use url::Url;

use crate::config::GithubConfig;

/// Extend a URL's path with `/`-separated components, percent-encoding each.
///
/// Splitting first keeps real separators as separators; only the characters
/// inside a component get encoded.
fn push_path(url: &mut Url, raw: &str) {
    // Opaque bases (mailto:, data:) have no segment list; `GithubClient::new`
    // rejects them, so through the client this branch is unreachable.
    let Ok(mut segments) = url.path_segments_mut() else {
        return;
    };
    segments.pop_if_empty();
    segments.extend(raw.split('/').filter(|s| !s.is_empty()));
}

/// Listing endpoint: `<api>/repos/{owner}/{repo}/contents/{path}?ref={rev}`.
///
/// An empty `path` lists the repository root.
pub fn contents_url(config: &GithubConfig, spec: &RepoSpec, path: &str) -> Url {
    let mut url = config.api_base.clone();
    push_path(&mut url, &format!("repos/{}/{}/contents", spec.owner, spec.repo));
    push_path(&mut url, path);
    url.query_pairs_mut().append_pair("ref", &spec.git_ref);
    url
}

/// Raw content endpoint: `<raw>/{owner}/{repo}/{rev}/{path}`.
pub fn raw_url(config: &GithubConfig, spec: &RepoSpec, path: &str) -> Url {
    let mut url = config.raw_base.clone();
    push_path(&mut url, &format!("{}/{}", spec.owner, spec.repo));
    push_path(&mut url, &spec.git_ref);
    push_path(&mut url, path);
    url
}

/// Archive endpoint: `<archive>/{owner}/{repo}/zip/{rev}`.
pub fn archive_url(config: &GithubConfig, spec: &RepoSpec) -> Url {
    let mut url = config.archive_base.clone();
    push_path(&mut url, &format!("{}/{}/zip", spec.owner, spec.repo));
    push_path(&mut url, &spec.git_ref);
    url
}

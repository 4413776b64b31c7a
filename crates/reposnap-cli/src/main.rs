//! CLI entry point - the composition root.
//!
//! This is the only place where the GitHub client, the zip extractor, and
//! the event printer are wired together into a `Snapshotter`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use reposnap_core::{ChannelEmitter, FetchEvent, RepoSpec};
use reposnap_download::{FetchOutcome, Snapshotter, ZipExtractor};
use reposnap_github::{GithubClient, GithubConfig};

/// Command-line interface for snapshotting a repository's file tree.
#[derive(Parser)]
#[command(name = "reposnap")]
#[command(about = "Snapshot a GitHub repository's file tree without git metadata")]
#[command(version)]
struct Cli {
    /// Repository to fetch: `owner/repo` or a full URL, optionally with
    /// `#ref` appended (defaults to `master`)
    repo: String,

    /// Git ref to fetch (branch, tag, or commit); overrides a `#ref` in REPO
    #[arg(short = 'r', long = "ref", value_name = "REF")]
    git_ref: Option<String>,

    /// Destination directory for the tree
    #[arg(short, long, default_value = ".")]
    dest: PathBuf,

    /// API token for authenticated requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print events as JSON lines instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut spec = RepoSpec::parse(&cli.repo)
        .with_context(|| format!("cannot parse repository '{}'", cli.repo))?;
    if let Some(git_ref) = cli.git_ref {
        spec.git_ref = git_ref;
    }
    debug!(repo = %spec.id(), git_ref = %spec.git_ref, "resolved repository spec");

    let mut config = GithubConfig::default();
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }

    let (emitter, mut events) = ChannelEmitter::channel();
    let json = cli.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event, json);
        }
    });

    let client = GithubClient::new(config).context("cannot initialize HTTP client")?;
    let snapshotter = Snapshotter::new(Arc::new(client), Arc::new(ZipExtractor::new()))
        .with_emitter(Arc::new(emitter));

    let result = snapshotter
        .fetch(spec, &cli.dest)
        .await
        .context("fetch failed");

    // Dropping the snapshotter releases the last event sender so the
    // printer drains and exits.
    drop(snapshotter);
    let _ = printer.await;

    match result? {
        FetchOutcome::Traversal => {}
        FetchOutcome::Fallback => {
            eprintln!("note: rate limited; tree was restored from an archive download");
        }
    }
    Ok(())
}

fn print_event(event: &FetchEvent, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        return;
    }
    match event {
        FetchEvent::DirCreated { path } => println!("dir  {path}"),
        FetchEvent::FileCreated { path } => println!("file {path}"),
        FetchEvent::FallbackStarted { url } => eprintln!("rate limited; downloading {url}"),
        FetchEvent::MalformedEntry { path, kind } => {
            eprintln!("skipped {path}: unsupported entry type '{kind}'");
        }
        FetchEvent::Error { message } => eprintln!("error: {message}"),
        FetchEvent::Done => println!("done"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repo_with_options() {
        let cli = Cli::parse_from([
            "reposnap",
            "octocat/hello#dev",
            "--dest",
            "/tmp/hello",
            "--json",
        ]);
        assert_eq!(cli.repo, "octocat/hello#dev");
        assert_eq!(cli.dest, PathBuf::from("/tmp/hello"));
        assert!(cli.json);
        assert!(cli.git_ref.is_none());
    }

    #[test]
    fn ref_flag_is_separate_from_repo() {
        let cli = Cli::parse_from(["reposnap", "octocat/hello", "--ref", "v1.0.0"]);
        assert_eq!(cli.git_ref.as_deref(), Some("v1.0.0"));
    }
}

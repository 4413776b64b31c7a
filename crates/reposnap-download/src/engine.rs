//! Job orchestration.
//!
//! [`Snapshotter`] is the public entry point: ports in, one `fetch` call per
//! job out. The traversal itself lives in [`crate::walker`] and the archive
//! path in [`crate::fallback`]; this module only wires a job up and awaits
//! its terminal state.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use reposnap_core::{ArchiveExtractor, EventEmitter, NoopEmitter, RepoClient, RepoSpec};

use crate::fs;
use crate::job::{FetchError, FetchOutcome, JobContext};
use crate::walker;

/// Materializes a repository tree onto local disk.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(GithubClient::new(GithubConfig::default())?);
/// let snapshotter = Snapshotter::new(client, Arc::new(ZipExtractor::new()));
/// let spec = RepoSpec::parse("rust-lang/cargo#main")?;
/// snapshotter.fetch(spec, "./cargo").await?;
/// ```
pub struct Snapshotter {
    client: Arc<dyn RepoClient>,
    extractor: Arc<dyn ArchiveExtractor>,
    emitter: Arc<dyn EventEmitter>,
    work_dir: PathBuf,
}

impl Snapshotter {
    /// Create a snapshotter over the given remote client and extractor.
    ///
    /// Notifications are discarded until [`Self::with_emitter`] installs a
    /// sink; fallback temp dirs are created under the process working
    /// directory unless [`Self::with_work_dir`] overrides it.
    pub fn new(client: Arc<dyn RepoClient>, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        Self {
            client,
            extractor,
            emitter: Arc::new(NoopEmitter::new()),
            work_dir: PathBuf::from("."),
        }
    }

    /// Install a notification sink.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Override where fallback temp directories are created.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Run one job: mirror `spec`'s tree into `dest`.
    ///
    /// Resolves when the job reaches its terminal state - either the
    /// traversal completion barrier or the end of the archive fallback.
    /// Per-item failures along the way surface as error notifications, not
    /// as an `Err` here; `Err` means the job could not reach `Done` at all.
    pub async fn fetch(
        &self,
        spec: RepoSpec,
        dest: impl Into<PathBuf>,
    ) -> Result<FetchOutcome, FetchError> {
        let dest = dest.into();
        info!(repo = %spec.id(), git_ref = %spec.git_ref, dest = %dest.display(), "starting fetch");
        fs::ensure_dir(&dest).await?;

        let (ctx, done) = JobContext::new(
            spec,
            dest,
            self.work_dir.clone(),
            Arc::clone(&self.client),
            Arc::clone(&self.extractor),
            Arc::clone(&self.emitter),
        );

        // Root listing: discovery slot first, then the walk.
        ctx.begin_discovery();
        tokio::spawn(walker::walk(Arc::clone(&ctx), String::new()));

        match done.await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Aborted),
        }
    }
}

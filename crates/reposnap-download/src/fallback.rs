//! Archive fallback.
//!
//! When a listing call reports rate limiting, incremental traversal is
//! abandoned: partial output is rolled back and the whole repository is
//! materialized from a single archive download instead. The transition is
//! one-way and runs exactly once per job no matter how many in-flight
//! listings observe the signal.

use std::path::PathBuf;

use tracing::{info, warn};

use reposnap_core::{FetchEvent, RepoSpec};

use crate::fs;
use crate::job::{FetchError, JobContext};

use std::sync::Arc;

/// Scratch space for one fallback run.
///
/// The directory name combines a millisecond timestamp with a random suffix
/// so two jobs sharing a working directory cannot collide.
struct ArchiveSession {
    temp_dir: PathBuf,
    archive_file: PathBuf,
}

impl ArchiveSession {
    fn new(work_dir: &std::path::Path, spec: &RepoSpec) -> Self {
        let name = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        );
        let temp_dir = work_dir.join(name);
        let archive_file = temp_dir.join(format!("{}.zip", spec.archive_root()));
        Self {
            temp_dir,
            archive_file,
        }
    }
}

/// Perform the fallback transition and, if this caller wins it, drive the
/// archive sequence to its terminal state.
///
/// Called from a listing task whose discovery slot is still outstanding;
/// that slot resolves here, after the flag flips, so it feeds the drain
/// rather than the terminal barrier.
pub(crate) async fn run(ctx: Arc<JobContext>) {
    let won = ctx.enter_fallback();
    ctx.listing_resolved(0);
    if !won {
        // Another listing already triggered fallback; nothing more to do.
        return;
    }

    // Wait out every in-flight traversal task. The token is cancelled, so
    // nothing new starts; once the counters drain, no write can race the
    // rollback below or the relocation into the destination.
    ctx.traversal_drained().await;

    // Roll back everything traversal wrote. Best effort: one stubborn path
    // does not stop the rest from being removed.
    for path in ctx.take_log() {
        if let Err(e) = fs::remove_path(&path).await {
            warn!(path = %path.display(), error = %e, "rollback failed for path");
            ctx.emit(FetchEvent::error(e));
        }
    }

    let url = ctx.client.archive_url(&ctx.spec);
    info!(%url, "falling back to archive download");
    ctx.emit(FetchEvent::fallback_started(url));

    let result = sequence(&ctx).await;
    if let Err(ref e) = result {
        warn!(error = %e, "archive fallback halted");
    }
    ctx.resolve_fallback(result);
}

/// The download-extract-relocate sequence. A failure at any step halts the
/// sequence at that step.
async fn sequence(ctx: &JobContext) -> Result<(), FetchError> {
    let session = ArchiveSession::new(&ctx.work_dir, &ctx.spec);

    fs::ensure_dir(&session.temp_dir).await?;
    ctx.client
        .download_archive(&ctx.spec, &session.archive_file)
        .await?;

    let extracted = ctx
        .extractor
        .extract(&session.archive_file, &session.temp_dir)
        .await?;

    // The archive expands under a single top-level folder; moving it into
    // place is the relocation step. The destination was emptied by rollback
    // (or never populated), so the rename target is an empty directory.
    let from = session.temp_dir.join(&extracted.root_dir);
    fs::rename_dir(&from, &ctx.dest).await?;

    fs::remove_dir_all(&session.temp_dir).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_names_are_unique_and_under_work_dir() {
        let spec = RepoSpec::new("o", "r", Some("main".to_string()));
        let work = std::path::Path::new("/tmp/work");

        let a = ArchiveSession::new(work, &spec);
        let b = ArchiveSession::new(work, &spec);

        assert_ne!(a.temp_dir, b.temp_dir);
        assert!(a.temp_dir.starts_with(work));
        assert_eq!(
            a.archive_file.file_name().unwrap().to_str().unwrap(),
            "r-main.zip"
        );
        assert_eq!(a.archive_file.parent().unwrap(), a.temp_dir);
    }
}

//! Concurrent tree traversal.
//!
//! `walk` lists one directory and fans out one task per returned entry, with
//! no pool or rate cap; sibling operations complete in any order. The only
//! ordering contract is causal: a directory is created before any of its
//! children's operations are dispatched, and a file's placeholder precedes
//! its content write.
//!
//! Cancellation comes from the fallback transition. A cancelled task writes
//! nothing further, but it still resolves its counter slot: the fallback
//! sequence waits for both counters to drain before rolling back, so every
//! slot must resolve no matter how its task ended.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use reposnap_core::{ClientError, EntryKind, FetchEvent, TreeEntry};

use crate::fs;
use crate::job::JobContext;

/// List `dir_path` (empty string = repository root) and dispatch its
/// entries.
///
/// The caller must have called `begin_discovery` for this listing before
/// spawning the walk. The future is boxed because the walk recurses through
/// `handle_dir`; the recursion needs a concrete future type.
pub(crate) fn walk(
    ctx: Arc<JobContext>,
    dir_path: String,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(walk_dir(ctx, dir_path))
}

async fn walk_dir(ctx: Arc<JobContext>, dir_path: String) {
    let listed = tokio::select! {
        biased;

        () = ctx.cancel.cancelled() => {
            ctx.listing_resolved(0);
            return;
        }

        result = ctx.client.list_dir(&ctx.spec, &dir_path) => result,
    };

    match listed {
        Ok(entries) => {
            debug!(path = %dir_path, count = entries.len(), "listing resolved");
            // Counters first: pending grows by the batch, this listing's
            // discovery slot resolves, and only then are the entries
            // dispatched.
            ctx.listing_resolved(entries.len() as u64);
            for entry in entries {
                tokio::spawn(handle_entry(Arc::clone(&ctx), entry));
            }
        }
        Err(ClientError::RateLimited { .. }) => {
            // Not an error: the defined transition into archive mode. The
            // fallback resolves this listing's discovery slot itself, after
            // the flag flips.
            crate::fallback::run(ctx).await;
        }
        Err(e) => {
            ctx.emit(FetchEvent::error(e));
            // The failed listing still resolves its discovery slot, so the
            // barrier can reach zero with an incomplete tree.
            ctx.listing_resolved(0);
        }
    }
}

/// Process one listing entry. Owns exactly one pending slot and releases it
/// on every exit path, including cancellation.
async fn handle_entry(ctx: Arc<JobContext>, entry: TreeEntry) {
    match entry.kind {
        EntryKind::Dir => handle_dir(&ctx, &entry.path).await,
        EntryKind::File => handle_file(&ctx, &entry.path).await,
        EntryKind::Other(kind) => {
            // Unified into the single event taxonomy, and the slot is still
            // released so the barrier can resolve.
            ctx.emit(FetchEvent::malformed_entry(entry.path, kind));
            ctx.finish_op();
        }
    }
}

async fn handle_dir(ctx: &Arc<JobContext>, path: &str) {
    if ctx.cancel.is_cancelled() {
        ctx.finish_op();
        return;
    }

    let local = ctx.dest.join(path);
    match fs::ensure_dir(&local).await {
        Ok(()) => {
            ctx.record_path(local);
            ctx.emit(FetchEvent::dir_created(path));
            ctx.begin_discovery();
            tokio::spawn(walk(Arc::clone(ctx), path.to_string()));
        }
        // Siblings proceed; the subtree below this directory is skipped.
        Err(e) => ctx.emit(FetchEvent::error(e)),
    }
    ctx.finish_op();
}

async fn handle_file(ctx: &Arc<JobContext>, path: &str) {
    if ctx.cancel.is_cancelled() {
        ctx.finish_op();
        return;
    }

    let local = ctx.dest.join(path);
    match fs::create_placeholder(&local).await {
        // Logged at creation: rollback must remove the placeholder even if
        // the content write never happens.
        Ok(()) => ctx.record_path(local.clone()),
        Err(e) => {
            ctx.emit(FetchEvent::error(e));
            ctx.finish_op();
            return;
        }
    }

    let bytes = tokio::select! {
        biased;

        () = ctx.cancel.cancelled() => {
            ctx.finish_op();
            return;
        }

        result = ctx.client.fetch_raw(&ctx.spec, path) => result,
    };

    match bytes {
        Ok(bytes) => {
            // Re-check the fence between the fetch resolving and the write
            // landing, so a late fetch cannot deposit bytes once the
            // fallback transition has happened.
            if ctx.cancel.is_cancelled() {
                ctx.finish_op();
                return;
            }
            if let Err(e) = fs::write_file(&local, &bytes).await {
                ctx.emit(FetchEvent::error(e));
            } else {
                ctx.emit(FetchEvent::file_created(path));
            }
        }
        Err(e) => ctx.emit(FetchEvent::error(e)),
    }
    ctx.finish_op();
}

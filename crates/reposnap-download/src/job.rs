//! Shared job state: completion counters, the one-way fallback flag, and the
//! log of paths written so far.
//!
//! Every concurrent operation holds an `Arc<JobContext>`; all counter and
//! flag mutations go through methods here, which evaluate the completion
//! barrier atomically with the mutation under a single lock. The terminal
//! notification can therefore never fire from a stale counter pair, and
//! fires at most once per job.
//!
//! The counters serve a second purpose after the fallback transition: the
//! terminal signal is permanently suppressed, but the fallback sequence
//! waits for both counters to drain before rolling back, so no traversal
//! write can land after rollback has run.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use reposnap_core::{
    ArchiveExtractor, ClientError, EventEmitter, ExtractError, FetchEvent, RepoClient, RepoSpec,
};

use crate::fs::FsError;

/// How a job reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The full incremental traversal completed.
    Traversal,
    /// The archive fallback completed.
    Fallback,
}

/// Failures that end a job without a `Done` notification.
///
/// Per-item traversal failures are not here: those surface as error events
/// and the traversal keeps going. This type covers the fallback sequence's
/// hard stops and the inability to prepare the destination at all.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A remote request failed during the fallback sequence.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A filesystem step failed during setup or the fallback sequence.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Archive extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Every task ended without reaching a terminal state.
    #[error("job ended without a terminal signal")]
    Aborted,
}

/// Counters and log behind the job lock.
#[derive(Debug, Default)]
struct JobState {
    /// Leaf operations started but not finished.
    pending: u64,
    /// Listing calls issued but not yet resolved into entries.
    discovery_pending: u64,
    /// One-way archive-fallback flag.
    fallback: bool,
    /// Paths created so far, consumed once by the fallback rollback.
    log: Vec<PathBuf>,
}

type DoneSender = oneshot::Sender<Result<FetchOutcome, FetchError>>;

/// Shared context for one download job.
pub(crate) struct JobContext {
    /// The repository being materialized.
    pub spec: RepoSpec,
    /// Destination directory for the tree.
    pub dest: PathBuf,
    /// Parent directory for fallback temp dirs.
    pub work_dir: PathBuf,
    /// Remote API access.
    pub client: Arc<dyn RepoClient>,
    /// Archive unpacking.
    pub extractor: Arc<dyn ArchiveExtractor>,
    /// Notification sink.
    pub emitter: Arc<dyn EventEmitter>,
    /// Cancelled the moment fallback triggers; observed before every
    /// traversal write so no new write starts once the transition happened.
    pub cancel: CancellationToken,
    state: Mutex<JobState>,
    done_tx: Mutex<Option<DoneSender>>,
    /// Flips to true when fallback is active and both counters are zero:
    /// traversal is quiescent and rollback may safely run.
    drained_tx: watch::Sender<bool>,
}

impl JobContext {
    /// Create a context and the receiver that resolves at the terminal state.
    pub fn new(
        spec: RepoSpec,
        dest: PathBuf,
        work_dir: PathBuf,
        client: Arc<dyn RepoClient>,
        extractor: Arc<dyn ArchiveExtractor>,
        emitter: Arc<dyn EventEmitter>,
    ) -> (Arc<Self>, oneshot::Receiver<Result<FetchOutcome, FetchError>>) {
        let (done_tx, done_rx) = oneshot::channel();
        let (drained_tx, _) = watch::channel(false);
        let ctx = Arc::new(Self {
            spec,
            dest,
            work_dir,
            client,
            extractor,
            emitter,
            cancel: CancellationToken::new(),
            state: Mutex::new(JobState::default()),
            done_tx: Mutex::new(Some(done_tx)),
            drained_tx,
        });
        (ctx, done_rx)
    }

    /// Emit a notification.
    pub fn emit(&self, event: FetchEvent) {
        self.emitter.emit(event);
    }

    /// A listing call is about to be issued.
    pub fn begin_discovery(&self) {
        let mut state = self.state.lock().expect("job state lock");
        state.discovery_pending += 1;
    }

    /// A listing call resolved into `entries` child operations (possibly
    /// zero: an empty directory, a failed listing, or a cancelled one - the
    /// discovery slot resolves in every case so the barrier stays balanced).
    pub fn listing_resolved(&self, entries: u64) {
        let mut state = self.state.lock().expect("job state lock");
        state.pending += entries;
        debug_assert!(state.discovery_pending > 0, "listing resolved twice");
        state.discovery_pending = state.discovery_pending.saturating_sub(1);
        self.check_barrier(&state);
    }

    /// One leaf operation finished: success, failure, or cancellation.
    pub fn finish_op(&self) {
        let mut state = self.state.lock().expect("job state lock");
        debug_assert!(state.pending > 0, "operation finished twice");
        state.pending = state.pending.saturating_sub(1);
        self.check_barrier(&state);
    }

    /// Record a created path in the job log.
    pub fn record_path(&self, path: PathBuf) {
        let mut state = self.state.lock().expect("job state lock");
        state.log.push(path);
    }

    /// Attempt the one-way transition into fallback mode.
    ///
    /// Returns `true` for exactly one caller per job; everyone else sees the
    /// flag already set. The cancellation token is cancelled while the lock
    /// is still held, so no traversal write can start after the transition.
    pub fn enter_fallback(&self) -> bool {
        let mut state = self.state.lock().expect("job state lock");
        if state.fallback {
            return false;
        }
        state.fallback = true;
        self.cancel.cancel();
        debug!("entered archive-fallback mode");
        self.check_barrier(&state);
        true
    }

    /// Wait until every outstanding traversal operation has finished.
    ///
    /// Only meaningful after [`Self::enter_fallback`]; the caller's own
    /// bookkeeping slots must already be resolved or the drain never
    /// completes.
    pub async fn traversal_drained(&self) {
        let mut rx = self.drained_tx.subscribe();
        // An error means the sender half is gone, which cannot outlive self.
        let _ = rx.wait_for(|drained| *drained).await;
    }

    /// Consume the path log for rollback. Called once, by the fallback
    /// sequence, after the traversal has drained.
    pub fn take_log(&self) -> Vec<PathBuf> {
        let mut state = self.state.lock().expect("job state lock");
        std::mem::take(&mut state.log)
    }

    /// Resolve the job from the fallback path.
    pub fn resolve_fallback(&self, result: Result<(), FetchError>) {
        match result {
            Ok(()) => {
                self.emit(FetchEvent::Done);
                self.resolve(Ok(FetchOutcome::Fallback));
            }
            Err(e) => {
                self.emit(FetchEvent::error(&e));
                self.resolve(Err(e));
            }
        }
    }

    /// The completion barrier, evaluated with the state lock held so it is
    /// atomic with the mutation that preceded it.
    ///
    /// Terminal `Done` fires iff both counters are zero and the fallback
    /// flag is unset. With the flag set the same zero-zero condition means
    /// traversal quiescence instead, and feeds the drain signal.
    fn check_barrier(&self, state: &JobState) {
        if state.pending != 0 || state.discovery_pending != 0 {
            return;
        }
        if state.fallback {
            // send_replace stores the value even with no receiver alive yet;
            // the fallback winner may subscribe only after quiescence was
            // already reached.
            let _ = self.drained_tx.send_replace(true);
        } else {
            self.emit(FetchEvent::Done);
            self.resolve(Ok(FetchOutcome::Traversal));
        }
    }

    fn resolve(&self, result: Result<FetchOutcome, FetchError>) {
        // Taking the sender makes resolution (and the Done event paired with
        // it) at-most-once even if the barrier condition holds across
        // several later checks.
        if let Some(tx) = self.done_tx.lock().expect("done lock").take() {
            let _ = tx.send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposnap_core::{ExtractedArchive, NoopEmitter, TreeEntry};
    use std::path::Path;

    struct UnusedClient;

    #[async_trait::async_trait]
    impl RepoClient for UnusedClient {
        async fn list_dir(&self, _: &RepoSpec, _: &str) -> Result<Vec<TreeEntry>, ClientError> {
            unreachable!("not exercised")
        }
        async fn fetch_raw(&self, _: &RepoSpec, _: &str) -> Result<Vec<u8>, ClientError> {
            unreachable!("not exercised")
        }
        async fn download_archive(&self, _: &RepoSpec, _: &Path) -> Result<(), ClientError> {
            unreachable!("not exercised")
        }
        fn archive_url(&self, _: &RepoSpec) -> String {
            String::new()
        }
    }

    struct UnusedExtractor;

    #[async_trait::async_trait]
    impl ArchiveExtractor for UnusedExtractor {
        async fn extract(&self, _: &Path, _: &Path) -> Result<ExtractedArchive, ExtractError> {
            unreachable!("not exercised")
        }
    }

    fn context() -> (
        Arc<JobContext>,
        oneshot::Receiver<Result<FetchOutcome, FetchError>>,
    ) {
        JobContext::new(
            RepoSpec::new("o", "r", None),
            PathBuf::from("dest"),
            PathBuf::from("."),
            Arc::new(UnusedClient),
            Arc::new(UnusedExtractor),
            Arc::new(NoopEmitter::new()),
        )
    }

    #[tokio::test]
    async fn completes_when_both_counters_drain() {
        let (ctx, mut done) = context();
        ctx.begin_discovery();
        assert!(done.try_recv().is_err());

        ctx.listing_resolved(2);
        assert!(done.try_recv().is_err());

        ctx.finish_op();
        assert!(done.try_recv().is_err());

        ctx.finish_op();
        assert_eq!(done.await.unwrap().unwrap(), FetchOutcome::Traversal);
    }

    #[tokio::test]
    async fn empty_root_listing_completes_immediately() {
        let (ctx, done) = context();
        ctx.begin_discovery();
        ctx.listing_resolved(0);
        assert_eq!(done.await.unwrap().unwrap(), FetchOutcome::Traversal);
    }

    #[tokio::test]
    async fn fallback_flag_suppresses_the_terminal_signal() {
        let (ctx, mut done) = context();
        ctx.begin_discovery();
        assert!(ctx.enter_fallback());
        ctx.listing_resolved(0);
        // Counters are zero but the flag suppresses the traversal terminal.
        assert!(done.try_recv().is_err());
    }

    #[tokio::test]
    async fn enter_fallback_is_one_way_and_single_winner() {
        let (ctx, _done) = context();
        assert!(ctx.enter_fallback());
        assert!(!ctx.enter_fallback());
        assert!(ctx.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn drain_waits_for_outstanding_operations() {
        let (ctx, _done) = context();
        ctx.begin_discovery();
        ctx.listing_resolved(1);
        ctx.enter_fallback();

        let waiter = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.traversal_drained().await })
        };
        assert!(!waiter.is_finished());

        ctx.finish_op();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn drain_resolves_immediately_when_already_quiescent() {
        let (ctx, _done) = context();
        ctx.enter_fallback();
        ctx.traversal_drained().await;
    }

    #[tokio::test]
    async fn drain_signal_survives_until_a_waiter_subscribes() {
        let (ctx, _done) = context();
        ctx.begin_discovery();
        ctx.enter_fallback();
        // Quiescence is reached while nobody is waiting, as happens when the
        // fallback-triggering listing was the only outstanding operation.
        ctx.listing_resolved(0);
        ctx.traversal_drained().await;
    }

    #[tokio::test]
    async fn log_is_consumed_exactly_once() {
        let (ctx, _done) = context();
        ctx.record_path(PathBuf::from("a"));
        ctx.record_path(PathBuf::from("b"));

        let log = ctx.take_log();
        assert_eq!(log, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert!(ctx.take_log().is_empty());
    }

    #[tokio::test]
    async fn fallback_resolution_reports_outcome() {
        let (ctx, done) = context();
        ctx.enter_fallback();
        ctx.resolve_fallback(Ok(()));
        assert_eq!(done.await.unwrap().unwrap(), FetchOutcome::Fallback);
    }
}

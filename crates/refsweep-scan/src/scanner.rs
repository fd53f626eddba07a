//! Parallel unused-resource scanner.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use refsweep_core::{
    ResourceIdentity, ResourceStore, ScanConfig, ScanError, ScanJob, ScanOutcome, ScanStats,
    ScriptCompiler, StringTable, TypeTag, UnusedResources,
};

use crate::candidates::CandidateSet;
use crate::extract::{Extraction, ReferenceExtractor};
use crate::progress::ScanProgress;
use crate::resolver::ScriptSymbolResolver;

/// Capacity of the progress broadcast channel.
const PROGRESS_CHANNEL_SIZE: usize = 100;

/// Finds resources of a target kind that no other resource references.
///
/// Every resource of the scannable kinds becomes one job on a bounded
/// worker pool. Jobs load their resource, extract references and strike
/// them from a shared [`CandidateSet`]; whatever survives is unused.
pub struct UnusedScanner {
    store: Arc<dyn ResourceStore>,
    extractor: ReferenceExtractor,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl UnusedScanner {
    /// Create a new scanner over the given collaborators.
    pub fn new(
        store: Arc<dyn ResourceStore>,
        compiler: Arc<dyn ScriptCompiler>,
        strings: Arc<dyn StringTable>,
    ) -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            store,
            extractor: ReferenceExtractor::new(ScriptSymbolResolver::new(compiler, strings)),
            progress_tx,
        }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Run a scan to completion or cancellation.
    ///
    /// Blocks the calling thread, which must not be a worker of a rayon pool.
    /// Returns `Err` only when the scan cannot start (invalid config,
    /// store unavailable); per-resource failures are absorbed.
    pub fn run(
        &self,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        config.validate()?;
        let start = Instant::now();
        let target_kind = config.target_kind.clone();

        let mut resources = Vec::new();
        for kind in &config.scannable_kinds {
            resources.extend(self.store.list_resources(kind)?);
        }
        let targets = self.store.list_resources(&target_kind)?;
        let candidates = CandidateSet::seed(target_kind.clone(), targets);

        let workers = config.effective_concurrency();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("refsweep-scan-{i}"))
            .build()
            .map_err(|e| ScanError::ThreadPool {
                message: e.to_string(),
            })?;

        info!(
            target = %target_kind,
            resources = resources.len(),
            candidates = candidates.len(),
            workers,
            "Starting unused resource scan"
        );

        let session = ScanSession::new(
            target_kind,
            candidates,
            resources.len() as u64,
            config.progress_interval.max(1),
            cancel.clone(),
            start,
        );
        let submitted = self.dispatch(&pool, &session, resources, workers);

        // The pool is quiescent here: the scope has joined every job.
        if session.is_cancelled() {
            info!(
                submitted,
                completed = session.completed.load(Ordering::Acquire),
                "Scan cancelled"
            );
            return Ok(ScanOutcome::Cancelled);
        }

        let unused = session.finish();
        info!(
            target = %unused.target_kind,
            unused = unused.len(),
            removed = unused.stats.removed,
            load_failures = unused.stats.load_failures,
            script_failures = unused.stats.script_failures,
            elapsed_ms = unused.scan_duration.as_millis() as u64,
            "Scan complete"
        );
        Ok(ScanOutcome::Completed(unused))
    }

    /// Submit one job per resource, never more than `limit` in flight.
    ///
    /// Returns after every submitted job has finished or abandoned its work.
    fn dispatch(
        &self,
        pool: &ThreadPool,
        session: &ScanSession,
        resources: Vec<ResourceIdentity>,
        limit: usize,
    ) -> usize {
        let (permit_tx, permit_rx) = crossbeam_channel::bounded::<()>(limit);
        let mut submitted = 0usize;

        pool.in_place_scope(|scope| {
            for resource in resources {
                if session.is_cancelled() {
                    debug!(submitted, "Cancelled, no further jobs submitted");
                    break;
                }
                let Some(permit) = Permit::acquire(&permit_tx, &permit_rx) else {
                    break;
                };
                // Admission may have blocked for a while.
                if session.is_cancelled() {
                    break;
                }

                let job = ScanJob::new(resource, session.target_kind.clone());
                scope.spawn(move |_| {
                    let _permit = permit;
                    self.process(job, session);
                });
                submitted += 1;
            }
        });

        submitted
    }

    /// Run one job. Checks for cancellation between stages and abandons the
    /// remaining work once it is observed.
    fn process(&self, job: ScanJob, session: &ScanSession) {
        if session.is_cancelled() {
            return;
        }

        let content = match self.store.load(&job.resource) {
            Ok(content) => content,
            Err(err) => {
                warn!(resource = %job.resource, error = %err, "Failed to load resource");
                session.load_failures.fetch_add(1, Ordering::Relaxed);
                session.complete(&job.resource, &self.progress_tx);
                return;
            }
        };

        if session.is_cancelled() {
            return;
        }
        let extraction = self
            .extractor
            .extract(&job.resource, &content, &job.target_kind);
        debug!(
            resource = %job.resource,
            shape = content.shape(),
            references = extraction.len(),
            "Inspected resource"
        );

        if session.is_cancelled() {
            return;
        }
        session.apply(&extraction);
        session.complete(&job.resource, &self.progress_tx);
    }
}

/// Admission slot on the worker pool. Dropping it frees the slot, also when
/// the job unwinds.
struct Permit {
    slots: Receiver<()>,
}

impl Permit {
    /// Block until fewer than `limit` permits are alive.
    fn acquire(tx: &Sender<()>, rx: &Receiver<()>) -> Option<Self> {
        tx.send(()).ok()?;
        Some(Self { slots: rx.clone() })
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        // One token is queued for every live permit.
        let _ = self.slots.try_recv();
    }
}

/// State of one scan run. Dropped when `run` returns.
struct ScanSession {
    target_kind: TypeTag,
    candidates: CandidateSet,
    initial_candidates: u64,
    total: u64,
    progress_interval: u64,
    cancel: CancellationToken,
    start: Instant,
    completed: AtomicU64,
    load_failures: AtomicU64,
    script_failures: AtomicU64,
    references_found: AtomicU64,
    removed: AtomicU64,
}

impl ScanSession {
    fn new(
        target_kind: TypeTag,
        candidates: CandidateSet,
        total: u64,
        progress_interval: u64,
        cancel: CancellationToken,
        start: Instant,
    ) -> Self {
        Self {
            target_kind,
            initial_candidates: candidates.len() as u64,
            candidates,
            total,
            progress_interval,
            cancel,
            start,
            completed: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
            script_failures: AtomicU64::new(0),
            references_found: AtomicU64::new(0),
            removed: AtomicU64::new(0),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Strike every extracted reference from the candidate set.
    fn apply(&self, extraction: &Extraction) {
        self.script_failures
            .fetch_add(extraction.script_failures, Ordering::Relaxed);
        self.references_found
            .fetch_add(extraction.len() as u64, Ordering::Relaxed);

        for reference in &extraction.references {
            if self.candidates.remove(reference.identity()) {
                self.removed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a finished job and broadcast progress when due.
    fn complete(&self, resource: &ResourceIdentity, progress_tx: &broadcast::Sender<ScanProgress>) {
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        if completed.is_multiple_of(self.progress_interval) || completed == self.total {
            // No subscribers is fine.
            let _ = progress_tx.send(ScanProgress {
                completed,
                total: self.total,
                removed: self.removed.load(Ordering::Relaxed),
                current: Some(resource.clone()),
                elapsed: self.start.elapsed(),
            });
        }
    }

    /// Consume the session into its result.
    fn finish(self) -> UnusedResources {
        let stats = ScanStats {
            total_resources: self.total,
            scanned: self.completed.into_inner(),
            load_failures: self.load_failures.into_inner(),
            script_failures: self.script_failures.into_inner(),
            references_found: self.references_found.into_inner(),
            removed: self.removed.into_inner(),
            initial_candidates: self.initial_candidates,
        };

        UnusedResources {
            target_kind: self.target_kind,
            resources: self.candidates.snapshot(),
            stats,
            scan_duration: self.start.elapsed(),
        }
    }
}

//! Search index synchronizer.
//!
//! Question mutations enqueue work into a per-question outbox. A background
//! dispatcher drains it under a global concurrency bound, reconciling each
//! question from the entity store when its job runs. Failed attempts retry
//! with jittered exponential backoff; once attempts run out the question is
//! marked stale and logged. Index failures never reach the mutating caller.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    EntityRepository, IndexOperation, SearchIndex, SearchIndexError, SearchIndexOutbox,
};
use crate::domain::{Error, QuestionId, SearchIndexEntry, SearchQuery, SearchResults, TraceId};

mod attempt_error;
mod runtime;

pub use attempt_error::IndexSyncError;
pub use runtime::{AttemptJitter, SearchSyncPorts, SearchSyncRuntime, TokioSleeper};

/// Synchronizer configuration controlling concurrency and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSyncConfig {
    /// Maximum number of questions written to the index at once.
    pub max_concurrent_writes: usize,
    /// Attempts per job, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on retry delay.
    pub max_backoff: Duration,
    /// Deadline for a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for SearchSyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_writes: 4,
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(2),
        }
    }
}

/// Async sleeping abstraction for retry delays.
#[async_trait]
pub trait IndexSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Retry backoff jitter abstraction.
pub trait BackoffJitter: Send + Sync {
    /// Return a jittered delay from the exponential base delay.
    ///
    /// ```rust
    /// use backend::domain::BackoffJitter;
    /// use chrono::{TimeZone, Utc};
    /// use std::time::Duration;
    /// struct Fixed;
    /// impl BackoffJitter for Fixed {
    ///     fn jittered_delay(&self, base: Duration, _attempt: u32, _now: chrono::DateTime<Utc>) -> Duration {
    ///         base * 2
    ///     }
    /// }
    /// let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
    /// assert_eq!(Fixed.jittered_delay(Duration::from_millis(50), 1, now), Duration::from_millis(100));
    /// ```
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration;
}

/// A question whose index entry could not be synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    /// Affected question.
    pub question_id: QuestionId,
    /// Operation that failed.
    pub operation: IndexOperation,
    /// Attempts made before giving up.
    pub attempts: u32,
    /// Last failure, rendered for operators.
    pub last_error: String,
    /// When the entry was marked stale.
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct PendingJob {
    operation: IndexOperation,
    trace_id: Option<TraceId>,
}

#[derive(Debug, Default)]
struct OutboxState {
    pending: HashMap<QuestionId, PendingJob>,
    order: VecDeque<QuestionId>,
    in_flight: HashSet<QuestionId>,
    stale: HashMap<QuestionId, StaleEntry>,
}

impl OutboxState {
    fn push(&mut self, question_id: QuestionId, job: PendingJob) {
        if self.pending.insert(question_id, job).is_none() {
            self.order.push_back(question_id);
        }
    }

    fn take_ready(&mut self) -> Option<(QuestionId, PendingJob)> {
        let position = self
            .order
            .iter()
            .position(|id| !self.in_flight.contains(id))?;
        let question_id = self.order.remove(position)?;
        let job = self.pending.remove(&question_id)?;
        self.in_flight.insert(question_id);
        Some((question_id, job))
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }
}

struct SyncInner {
    index: Arc<dyn SearchIndex>,
    repository: Arc<dyn EntityRepository>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn IndexSleeper>,
    jitter: Arc<dyn BackoffJitter>,
    config: SearchSyncConfig,
    permits: Arc<Semaphore>,
    state: Mutex<OutboxState>,
    wake: Notify,
    idle: Notify,
}

/// Keeps the search index eventually consistent with the entity store.
///
/// Cloning is cheap; clones share the outbox and dispatcher.
#[derive(Clone)]
pub struct SearchIndexSynchronizer {
    inner: Arc<SyncInner>,
    dispatcher: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SearchIndexSynchronizer {
    /// Build a synchronizer using default runtime dependencies.
    pub fn new(ports: SearchSyncPorts, clock: Arc<dyn Clock>, config: SearchSyncConfig) -> Self {
        Self::with_runtime(ports, clock, SearchSyncRuntime::default(), config)
    }

    /// Build a synchronizer with injected runtime abstractions.
    pub fn with_runtime(
        ports: SearchSyncPorts,
        clock: Arc<dyn Clock>,
        runtime: SearchSyncRuntime,
        config: SearchSyncConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_writes.max(1)));
        Self {
            inner: Arc::new(SyncInner {
                index: ports.index,
                repository: ports.repository,
                clock,
                sleeper: runtime.sleeper,
                jitter: runtime.jitter,
                config,
                permits,
                state: Mutex::new(OutboxState::default()),
                wake: Notify::new(),
                idle: Notify::new(),
            }),
            dispatcher: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the background dispatcher. Must run inside a Tokio runtime.
    ///
    /// Calling `start` again while the dispatcher runs has no effect. Jobs
    /// enqueued before `start` are kept and processed once it runs.
    pub fn start(&self) {
        let mut slot = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        *slot = Some(tokio::spawn(run_dispatcher(inner)));
        info!(
            max_concurrent_writes = self.inner.config.max_concurrent_writes,
            "search index dispatcher started"
        );
    }

    /// Stop the dispatcher. Pending jobs stay queued.
    pub fn shutdown(&self) {
        let handle = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Queue a projection refresh for `question_id`.
    pub fn upsert(&self, question_id: QuestionId) {
        self.push(question_id, IndexOperation::Upsert);
    }

    /// Queue removal of `question_id` from the index.
    pub fn remove(&self, question_id: QuestionId) {
        self.push(question_id, IndexOperation::Remove);
    }

    /// Resolve once the outbox is empty and no job is running.
    ///
    /// The dispatcher must be running or this never resolves.
    pub async fn flush(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.inner.lock_state().is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Queue an upsert for every stored question.
    ///
    /// Returns the number of questions queued.
    pub async fn reindex_all(&self) -> Result<usize, Error> {
        let questions = self
            .inner
            .repository
            .list_questions()
            .await
            .map_err(crate::domain::store::map_repository_error)?;
        for question in &questions {
            self.upsert(question.id);
        }
        info!(count = questions.len(), "queued full search reindex");
        Ok(questions.len())
    }

    /// Queue another attempt for every stale question.
    pub fn retry_stale(&self) -> usize {
        let ids = self
            .inner
            .lock_state()
            .stale
            .keys()
            .copied()
            .collect::<Vec<_>>();
        for id in &ids {
            self.upsert(*id);
        }
        ids.len()
    }

    /// Questions whose last sync ran out of attempts.
    pub fn stale_entries(&self) -> Vec<StaleEntry> {
        let mut entries = self
            .inner
            .lock_state()
            .stale
            .values()
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.marked_at);
        entries
    }

    /// Whether `question_id` is currently marked stale.
    pub fn is_stale(&self, question_id: &QuestionId) -> bool {
        self.inner.lock_state().stale.contains_key(question_id)
    }

    /// Number of jobs waiting or running.
    pub fn backlog(&self) -> usize {
        let state = self.inner.lock_state();
        state.pending.len() + state.in_flight.len()
    }

    fn push(&self, question_id: QuestionId, operation: IndexOperation) {
        let job = PendingJob {
            operation,
            trace_id: TraceId::current(),
        };
        self.inner.lock_state().push(question_id, job);
        debug!(%question_id, ?operation, "queued search index job");
        self.inner.wake.notify_one();
    }
}

impl SearchIndexOutbox for SearchIndexSynchronizer {
    fn enqueue(&self, question_id: QuestionId, operation: IndexOperation) {
        self.push(question_id, operation);
    }
}

/// Execute `query` against `index` with a deadline, ranking the hits.
pub(crate) async fn run_query(
    index: &dyn SearchIndex,
    query: &SearchQuery,
    timeout: Duration,
) -> Result<SearchResults, Error> {
    match tokio::time::timeout(timeout, index.query(query)).await {
        Ok(Ok(hits)) => Ok(SearchResults::ranked(hits)),
        Ok(Err(SearchIndexError::Rejected { message })) => {
            Err(Error::invalid_request(format!("search rejected: {message}")))
        }
        Ok(Err(error)) => {
            warn!(%error, "search query failed");
            Err(Error::service_unavailable("search is temporarily unavailable"))
        }
        Err(_) => {
            warn!(?timeout, "search query timed out");
            Err(Error::service_unavailable("search is temporarily unavailable"))
        }
    }
}

async fn run_dispatcher(inner: Arc<SyncInner>) {
    loop {
        let Ok(permit) = Arc::clone(&inner.permits).acquire_owned().await else {
            error!("search index semaphore closed; dispatcher stopping");
            return;
        };
        let (question_id, job) = loop {
            let notified = inner.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(ready) = inner.lock_state().take_ready() {
                break ready;
            }
            notified.await;
        };
        let worker = Arc::clone(&inner);
        tokio::spawn(async move {
            TraceId::scope_optional(job.trace_id, worker.process(question_id, job, permit)).await;
        });
    }
}

impl SyncInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, OutboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn process(&self, question_id: QuestionId, job: PendingJob, permit: OwnedSemaphorePermit) {
        let mut slot = InFlightSlot {
            inner: self,
            question_id,
            operation: job.operation,
            settled: false,
        };
        let result = self.sync_with_retry(question_id, job.operation).await;
        drop(permit);
        slot.settled = true;
        self.settle(
            question_id,
            job.operation,
            result.map_err(|(attempts, failure)| (attempts, failure.to_string())),
        );
    }

    /// Record the outcome of a job and release its in-flight slot.
    fn settle(
        &self,
        question_id: QuestionId,
        operation: IndexOperation,
        result: Result<u32, (u32, String)>,
    ) {
        let now = self.clock.utc();
        let idle = {
            let mut state = self.lock_state();
            match result {
                Ok(attempts) => {
                    if state.stale.remove(&question_id).is_some() {
                        info!(%question_id, "stale search entry recovered");
                    }
                    debug!(%question_id, ?operation, attempts, "search index synced");
                }
                Err((attempts, last_error)) => {
                    error!(
                        %question_id,
                        ?operation,
                        attempts,
                        error = %last_error,
                        "search index entry marked stale"
                    );
                    state.stale.insert(
                        question_id,
                        StaleEntry {
                            question_id,
                            operation,
                            attempts,
                            last_error,
                            marked_at: now,
                        },
                    );
                }
            }
            state.in_flight.remove(&question_id);
            state.is_idle()
        };

        self.wake.notify_one();
        if idle {
            self.idle.notify_waiters();
        }
    }

    async fn sync_with_retry(
        &self,
        question_id: QuestionId,
        operation: IndexOperation,
    ) -> Result<u32, (u32, IndexSyncError)> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let outcome =
                tokio::time::timeout(self.config.attempt_timeout, self.sync_once(question_id, operation))
                    .await
                    .unwrap_or(Err(IndexSyncError::TimedOut(self.config.attempt_timeout)));
            match outcome {
                Ok(()) => return Ok(attempt),
                Err(failure) if failure.is_retryable() && attempt < max_attempts => {
                    let base_delay = self.retry_base_delay(attempt);
                    let delay = self
                        .jitter
                        .jittered_delay(base_delay, attempt, self.clock.utc());
                    warn!(
                        %question_id,
                        attempt,
                        error = %failure,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "search index sync failed; retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err((attempt, failure)),
            }
        }
    }

    async fn sync_once(
        &self,
        question_id: QuestionId,
        operation: IndexOperation,
    ) -> Result<(), IndexSyncError> {
        if operation == IndexOperation::Remove {
            return Ok(self.index.remove(&question_id).await?);
        }

        let Some(question) = self.repository.find_question(&question_id).await? else {
            // The question was destroyed after this job was queued.
            return Ok(self.index.remove(&question_id).await?);
        };
        let author = self
            .repository
            .find_user(&question.author_id)
            .await?
            .ok_or_else(|| {
                crate::domain::ports::EntityRepositoryError::missing_reference("author_id")
            })?;
        let entry = SearchIndexEntry::project(&question, &author.email);
        Ok(self.index.upsert(&entry).await?)
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

/// Holds a question's in-flight slot for the life of its worker.
///
/// A worker that unwinds or is cancelled before settling still frees the
/// slot, so later jobs for the question run and `flush` resolves. The
/// entry is marked stale.
struct InFlightSlot<'a> {
    inner: &'a SyncInner,
    question_id: QuestionId,
    operation: IndexOperation,
    settled: bool,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.settle(
                self.question_id,
                self.operation,
                Err((0, "search index worker aborted".to_owned())),
            );
        }
    }
}

//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Only
//! compiled for tests or with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    FixtureSearchIndexOutbox, SearchIndex, SearchIndexError, SearchIndexOutbox,
};
use crate::domain::{
    BackoffJitter, BoardService, BoardServiceConfig, BoardServicePorts, IndexSleeper,
    QuestionId, SearchHit, SearchIndexEntry, SearchIndexSynchronizer, SearchQuery,
    SearchSyncConfig, SearchSyncPorts, SearchSyncRuntime, TraceId,
};
use crate::outbound::persistence::InMemoryEntityRepository;
use crate::outbound::search::InMemorySearchIndex;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

/// Instant used as "now" by default in tests.
pub fn test_epoch() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single() {
        Some(now) => now,
        None => panic!("valid test epoch"),
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0) += delta;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Sleeper that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl IndexSleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Sleeper that records requested delays without waiting.
#[derive(Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far.
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl IndexSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0).push(duration);
    }
}

/// Jitter strategy returning the base delay unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl BackoffJitter for NoJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32, _now: DateTime<Utc>) -> Duration {
        base
    }
}

/// Write recorded by [`ScriptedSearchIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    /// An upsert attempt for the question.
    Upsert(QuestionId),
    /// A remove attempt for the question.
    Remove(QuestionId),
}

/// Search index wrapper that fails on cue and records every write.
///
/// Scripted failures are consumed one per write attempt. Successful writes
/// are forwarded to an [`InMemorySearchIndex`].
#[derive(Default)]
pub struct ScriptedSearchIndex {
    inner: InMemorySearchIndex,
    failures: Mutex<VecDeque<SearchIndexError>>,
    calls: Mutex<Vec<IndexCall>>,
    traces: Mutex<Vec<Option<TraceId>>>,
    write_delay: Mutex<Option<Duration>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedSearchIndex {
    /// Create a healthy index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next write attempts with `errors`, in order.
    pub fn fail_next(&self, errors: impl IntoIterator<Item = SearchIndexError>) {
        lock(&self.failures).extend(errors);
    }

    /// Hold every write for `delay` before completing it.
    pub fn delay_writes(&self, delay: Duration) {
        *lock(&self.write_delay) = Some(delay);
    }

    /// Writes attempted so far.
    pub fn calls(&self) -> Vec<IndexCall> {
        lock(&self.calls).clone()
    }

    /// Trace ids observed during writes.
    pub fn traces(&self) -> Vec<Option<TraceId>> {
        lock(&self.traces).clone()
    }

    /// Highest number of writes observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// The wrapped index holding successful writes.
    pub fn contents(&self) -> &InMemorySearchIndex {
        &self.inner
    }

    async fn begin(&self, call: IndexCall) -> Result<(), SearchIndexError> {
        lock(&self.calls).push(call);
        lock(&self.traces).push(TraceId::current());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);

        let delay = *lock(&self.write_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        match lock(&self.failures).pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchIndex for ScriptedSearchIndex {
    async fn upsert(&self, entry: &SearchIndexEntry) -> Result<(), SearchIndexError> {
        self.begin(IndexCall::Upsert(entry.question_id)).await?;
        self.inner.upsert(entry).await
    }

    async fn remove(&self, question_id: &QuestionId) -> Result<(), SearchIndexError> {
        self.begin(IndexCall::Remove(*question_id)).await?;
        self.inner.remove(question_id).await
    }

    async fn query(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchIndexError> {
        self.inner.query(query).await
    }
}

/// A fully wired board over in-memory adapters.
pub struct TestBoard {
    /// Orchestrator and read-side service.
    pub service: Arc<BoardService>,
    /// Background index worker, already started.
    pub synchronizer: SearchIndexSynchronizer,
    /// Authoritative records.
    pub repository: Arc<InMemoryEntityRepository>,
    /// Index fed by the synchronizer.
    pub index: Arc<ScriptedSearchIndex>,
    /// Clock used for timestamps.
    pub clock: Arc<MutableClock>,
}

impl TestBoard {
    /// Wire a board with default configuration. Requires a Tokio runtime.
    pub fn new() -> Self {
        Self::with_config(BoardServiceConfig::default(), fast_sync_config())
    }

    /// Wire a board with explicit configuration. Requires a Tokio runtime.
    pub fn with_config(board: BoardServiceConfig, sync: SearchSyncConfig) -> Self {
        let repository = Arc::new(InMemoryEntityRepository::new());
        let index = Arc::new(ScriptedSearchIndex::new());
        let clock = Arc::new(MutableClock::new(test_epoch()));
        let synchronizer = SearchIndexSynchronizer::with_runtime(
            SearchSyncPorts::new(index.clone(), repository.clone()),
            clock.clone(),
            SearchSyncRuntime {
                sleeper: Arc::new(ImmediateSleeper),
                jitter: Arc::new(NoJitter),
            },
            sync,
        );
        synchronizer.start();
        let service = Arc::new(BoardService::new(
            BoardServicePorts {
                repository: repository.clone(),
                index: index.clone(),
                outbox: Arc::new(synchronizer.clone()),
            },
            clock.clone(),
            board,
        ));
        Self {
            service,
            synchronizer,
            repository,
            index,
            clock,
        }
    }
}

/// Build a board service whose index outbox discards all work.
pub fn service_without_index(repository: Arc<InMemoryEntityRepository>) -> BoardService {
    let outbox: Arc<dyn SearchIndexOutbox> = Arc::new(FixtureSearchIndexOutbox);
    BoardService::new(
        BoardServicePorts {
            repository,
            index: Arc::new(InMemorySearchIndex::new()),
            outbox,
        },
        Arc::new(MutableClock::new(test_epoch())),
        BoardServiceConfig::default(),
    )
}

/// Synchronizer settings with short timeouts for tests.
pub fn fast_sync_config() -> SearchSyncConfig {
    SearchSyncConfig {
        max_concurrent_writes: 2,
        max_attempts: 3,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(40),
        attempt_timeout: Duration::from_millis(500),
    }
}

//! Port and runtime dependency bundles for the search index synchronizer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{EntityRepository, SearchIndex};

use super::{BackoffJitter, IndexSleeper};

/// Ports the synchronizer reads from and writes to.
pub struct SearchSyncPorts {
    /// Full-text engine receiving projections.
    pub index: Arc<dyn SearchIndex>,
    /// Authoritative store read when a job runs.
    pub repository: Arc<dyn EntityRepository>,
}

impl SearchSyncPorts {
    /// Bundle the synchronizer ports.
    pub fn new(index: Arc<dyn SearchIndex>, repository: Arc<dyn EntityRepository>) -> Self {
        Self { index, repository }
    }
}

/// Runtime helpers used by the retry policy.
pub struct SearchSyncRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn IndexSleeper>,
    /// Jitter strategy for retry delays.
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for SearchSyncRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(AttemptJitter),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl IndexSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds up to a quarter of the base delay, seeded from the clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptJitter;

impl BackoffJitter for AttemptJitter {
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = (base_ms / 4).max(1);
        let seed = u64::from(now.timestamp_subsec_nanos()) ^ u64::from(attempt);
        let extra = seed % (max_extra.saturating_add(1));
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

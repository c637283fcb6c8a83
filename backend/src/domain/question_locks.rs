//! Per-question exclusive critical sections.
//!
//! Every mutation touching a question or its answers holds the question's
//! guard from target resolution until side effects have been enqueued, so
//! committed states are linearizable per question. Entries are stored as
//! weak references and pruned once no guard or waiter holds them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::QuestionId;

/// Guard proving exclusive access to one question.
#[derive(Debug)]
pub struct QuestionGuard {
    question_id: QuestionId,
    _guard: OwnedMutexGuard<()>,
}

impl QuestionGuard {
    /// The question this guard serializes.
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }
}

/// Registry of per-question async mutexes.
///
/// # Examples
/// ```
/// use backend::domain::{QuestionId, QuestionLocks};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let locks = QuestionLocks::default();
/// let id = QuestionId::random();
/// let guard = locks.lock(id).await;
/// assert_eq!(guard.question_id(), id);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct QuestionLocks {
    entries: Mutex<HashMap<QuestionId, Weak<AsyncMutex<()>>>>,
}

impl QuestionLocks {
    /// Wait for exclusive access to `question_id`.
    pub async fn lock(&self, question_id: QuestionId) -> QuestionGuard {
        let mutex = self.entry(question_id);
        let guard = mutex.lock_owned().await;
        QuestionGuard {
            question_id,
            _guard: guard,
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.len()
    }

    fn entry(&self, question_id: QuestionId) -> Arc<AsyncMutex<()>> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(existing) = entries.get(&question_id).and_then(Weak::upgrade) {
            return existing;
        }
        entries.retain(|_, weak| weak.strong_count() > 0);
        let fresh = Arc::new(AsyncMutex::new(()));
        entries.insert(question_id, Arc::downgrade(&fresh));
        fresh
    }
}

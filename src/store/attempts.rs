use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::models::Attempt;
use crate::domain::AttemptError;

/// In-process store of attempt records with optimistic concurrency.
///
/// Attempts are keyed by id; a secondary index maps (learner, quiz) to the
/// most recent attempt, which callers treat as canonical. Records are never
/// deleted. Readers receive whole-record `Arc` snapshots and can run
/// concurrently with writers; a reader may observe a slightly stale attempt
/// but never a partially written one.
pub(crate) struct AttemptStore {
    max_swap_attempts: u32,
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    attempts: HashMap<String, VersionedAttempt>,
    latest: HashMap<(String, String), String>,
}

struct VersionedAttempt {
    version: u64,
    record: Arc<Attempt>,
}

impl AttemptStore {
    pub(crate) fn new(max_swap_attempts: u32) -> Self {
        Self { max_swap_attempts: max_swap_attempts.max(1), inner: RwLock::new(StoreInner::default()) }
    }

    pub(crate) fn get(&self, attempt_id: &str) -> Option<Arc<Attempt>> {
        self.read().attempts.get(attempt_id).map(|stored| Arc::clone(&stored.record))
    }

    pub(crate) fn latest_for(&self, learner_id: &str, quiz_id: &str) -> Option<Arc<Attempt>> {
        let inner = self.read();
        let attempt_id = inner.latest.get(&(learner_id.to_string(), quiz_id.to_string()))?;
        inner.attempts.get(attempt_id).map(|stored| Arc::clone(&stored.record))
    }

    /// Returns the most recent attempt for the learner and quiz, or inserts
    /// the one produced by `build`. The exists-check and insert happen under
    /// one write guard so two concurrent starts cannot both create.
    ///
    /// The second element is true when a new attempt was created.
    pub(crate) fn start_attempt<F>(
        &self,
        learner_id: &str,
        quiz_id: &str,
        restart: bool,
        build: F,
    ) -> (Arc<Attempt>, bool)
    where
        F: FnOnce() -> Attempt,
    {
        let key = (learner_id.to_string(), quiz_id.to_string());
        let mut inner = self.write();

        if !restart {
            let existing = inner
                .latest
                .get(&key)
                .and_then(|attempt_id| inner.attempts.get(attempt_id))
                .map(|stored| Arc::clone(&stored.record));
            if let Some(existing) = existing {
                return (existing, false);
            }
        }

        let attempt = Arc::new(build());
        inner.latest.insert(key, attempt.id.clone());
        inner.attempts.insert(
            attempt.id.clone(),
            VersionedAttempt { version: 0, record: Arc::clone(&attempt) },
        );
        (attempt, true)
    }

    /// The only mutation primitive. Reads the current record, applies the
    /// mutator outside any lock, and writes back only if no other writer got
    /// in between; otherwise the read-mutate-write cycle is retried up to
    /// `max_swap_attempts` times before surfacing the transient `Conflict`.
    ///
    /// Mutator errors pass through unchanged and leave the record untouched.
    pub(crate) fn compare_and_swap<F>(
        &self,
        attempt_id: &str,
        mutate: F,
    ) -> Result<Arc<Attempt>, AttemptError>
    where
        F: Fn(&Attempt) -> Result<Attempt, AttemptError>,
    {
        for _ in 0..self.max_swap_attempts {
            let (version, snapshot) = {
                let inner = self.read();
                let stored = inner
                    .attempts
                    .get(attempt_id)
                    .ok_or_else(|| AttemptError::AttemptNotFound(attempt_id.to_string()))?;
                (stored.version, Arc::clone(&stored.record))
            };

            let updated = mutate(&snapshot)?;

            let mut inner = self.write();
            let stored = inner
                .attempts
                .get_mut(attempt_id)
                .ok_or_else(|| AttemptError::AttemptNotFound(attempt_id.to_string()))?;
            if stored.version != version {
                continue;
            }
            stored.version += 1;
            stored.record = Arc::new(updated);
            return Ok(Arc::clone(&stored.record));
        }

        Err(AttemptError::Conflict(attempt_id.to_string()))
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.read().attempts.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

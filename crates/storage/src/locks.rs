//! The two lock tables a storage server holds: the sentence-lock set
//! held for the duration of a `WRITE` session's think-time, and the
//! per-filename commit lock held only during phase 3 (or `UNDO`).
//!
//! `dashmap` backs the sentence-lock set so unrelated files' locks
//! never contend on one coarse mutex.

use std::sync::{Arc, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// The set of `(filename, sentence_index)` pairs currently locked by
/// an in-progress `WRITE` session.
#[derive(Debug, Default)]
pub struct SentenceLocks {
    held: DashMap<(String, i64), ()>,
}

impl SentenceLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to acquire the lock for `(filename, index)`. Returns
    /// `true` on success, `false` if already held.
    pub fn try_lock(&self, filename: &str, index: i64) -> bool {
        match self.held.entry((filename.to_string(), index)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(());
                true
            }
        }
    }

    /// Releases the lock for `(filename, index)`. A no-op if not held
    /// (releasing twice, or releasing a lock that was never taken, is
    /// not an error; callers release unconditionally on every exit
    /// path of a `WRITE` session).
    pub fn unlock(&self, filename: &str, index: i64) {
        self.held.remove(&(filename.to_string(), index));
    }

    /// Whether `(filename, index)` is currently locked.
    #[must_use]
    pub fn is_locked(&self, filename: &str, index: i64) -> bool {
        self.held.contains_key(&(filename.to_string(), index))
    }
}

/// Per-filename commit mutexes, created lazily and never destroyed.
/// Acquired by `WRITE` phase 3 and by `UNDO`; never by phase 1 or 2,
/// which only touch the sentence-lock set above.
#[derive(Debug, Default)]
pub struct FileLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the commit mutex for `filename`, creating it if this is
    /// the first request for that name.
    pub fn get(&self, filename: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(filename.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_lock_rejects_second_acquisition() {
        let locks = SentenceLocks::new();
        assert!(locks.try_lock("a.txt", 0));
        assert!(!locks.try_lock("a.txt", 0));
    }

    #[test]
    fn sentence_lock_is_per_index() {
        let locks = SentenceLocks::new();
        assert!(locks.try_lock("a.txt", 0));
        assert!(locks.try_lock("a.txt", 1));
    }

    #[test]
    fn unlock_then_relock_succeeds() {
        let locks = SentenceLocks::new();
        assert!(locks.try_lock("a.txt", 0));
        locks.unlock("a.txt", 0);
        assert!(locks.try_lock("a.txt", 0));
    }

    #[test]
    fn unlock_of_unheld_lock_is_harmless() {
        let locks = SentenceLocks::new();
        locks.unlock("a.txt", 0);
        assert!(!locks.is_locked("a.txt", 0));
    }

    #[test]
    fn file_locks_return_the_same_mutex_for_repeat_lookups() {
        let locks = FileLocks::new();
        let a = locks.get("a.txt");
        let b = locks.get("a.txt");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn file_locks_are_independent_across_filenames() {
        let locks = FileLocks::new();
        let a = locks.get("a.txt");
        let b = locks.get("b.txt");
        assert!(!Arc::ptr_eq(&a, &b));
    }
}

//! The monotonic modification log that resolves the sentence-index
//! drift problem: a write session's target index can shift while it
//! holds its lock if another committed write changed the sentence
//! count ahead of it.
//!
//! One append-only list, shared by every file on this server, never
//! truncated for the server's lifetime; bounded-growth compaction is
//! left undone since truncation would break shift computation for any
//! in-flight session whose log position predates it.

use std::sync::Mutex;

/// One committed change to a file's sentence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModLogEntry {
    pub id: u64,
    pub filename: String,
    pub original_sentence_index: i64,
    pub sentence_delta: i64,
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<ModLogEntry>,
    next_id: u64,
}

/// The shared modification log for one storage server.
#[derive(Debug, Default)]
pub struct ModLog {
    state: Mutex<State>,
}

impl ModLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the *next* appended entry will receive. A `WRITE`
    /// session snapshots this at phase 1 to know which later entries
    /// describe commits that happened after it began.
    pub fn next_id(&self) -> u64 {
        self.state.lock().expect("mod log mutex poisoned").next_id
    }

    /// Appends a committed sentence-count change and returns its id.
    pub fn append(&self, filename: &str, original_sentence_index: i64, sentence_delta: i64) -> u64 {
        let mut state = self.state.lock().expect("mod log mutex poisoned");
        let id = state.next_id;
        state.entries.push(ModLogEntry {
            id,
            filename: filename.to_string(),
            original_sentence_index,
            sentence_delta,
        });
        state.next_id += 1;
        id
    }

    /// Sums the `sentence_delta` of every entry that (a) was appended
    /// at or after `session_start_log_id`, (b) targets `filename`, and
    /// (c) landed strictly before `sentence_index`: the positional
    /// shift a writer's originally requested index must absorb at
    /// commit time.
    pub fn shift_for(&self, filename: &str, session_start_log_id: u64, sentence_index: i64) -> i64 {
        let state = self.state.lock().expect("mod log mutex poisoned");
        state
            .entries
            .iter()
            .filter(|e| {
                e.id >= session_start_log_id
                    && e.filename == filename
                    && e.original_sentence_index < sentence_index
            })
            .map(|e| e.sentence_delta)
            .sum()
    }

    /// The running total of `sentence_delta` for `filename`, used by
    /// tests to check that the log's deltas sum to the net
    /// sentence-count change since file creation.
    #[cfg(test)]
    pub fn total_delta_for(&self, filename: &str) -> i64 {
        let state = self.state.lock().expect("mod log mutex poisoned");
        state.entries.iter().filter(|e| e.filename == filename).map(|e| e.sentence_delta).sum()
    }
}

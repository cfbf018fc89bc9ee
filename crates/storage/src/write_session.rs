//! The two-phase, session-based sentence editor.

use scribe_core::WireError;
use scribe_tokenizer as tok;

use crate::error::StorageError;
use crate::file_store::{ContentStats, FileStore};
use crate::locks::{FileLocks, SentenceLocks};
use crate::mod_log::ModLog;

/// One buffered edit within an open `WRITE` session: replace-by-splice
/// the words at `word_index` within the session's locked sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedUpdate {
    pub word_index: usize,
    pub content: String,
}

/// State a storage server worker thread owns for the lifetime of one
/// `WRITE` client connection: the sentence it locked, the log tip it
/// saw at lock time, and the edits buffered so far.
#[derive(Debug)]
pub struct WriteSession {
    filename: String,
    requested_sentence_index: i64,
    session_start_log_id: u64,
    buffered_updates: Vec<BufferedUpdate>,
}

impl WriteSession {
    /// Phase 0 + phase 1: validates `sentence_index` against the
    /// file's current shape, then acquires the sentence lock and
    /// snapshots the log tip.
    ///
    /// Returns [`WireError::Locked`] if the sentence is already being
    /// edited, [`WireError::BadRequest`] if the index is out of range.
    pub fn open(
        store: &FileStore,
        sentence_locks: &SentenceLocks,
        mod_log: &ModLog,
        filename: &str,
        sentence_index: i64,
    ) -> Result<Self, WireError> {
        let content = if store.exists(filename) {
            store.read_to_string(filename)?
        } else {
            String::new()
        };
        let sentences = tok::split_into_sentences(&content);
        let max_valid = tok::max_valid_write_index(&sentences) as i64;
        if sentence_index < 0 || sentence_index > max_valid {
            return Err(StorageError::SentenceIndexOutOfRange(sentence_index, max_valid as usize).into());
        }

        if !sentence_locks.try_lock(filename, sentence_index) {
            return Err(StorageError::SentenceLocked(filename.to_string(), sentence_index).into());
        }

        Ok(Self {
            filename: filename.to_string(),
            requested_sentence_index: sentence_index,
            session_start_log_id: mod_log.next_id(),
            buffered_updates: Vec::new(),
        })
    }

    /// Phase 2: buffers one `<word_index> <content>` line. Does not
    /// touch file bytes or validate against the live file; validation
    /// of `word_index` happens against the materialized view at
    /// commit time, since the file may change shape before then.
    pub fn buffer(&mut self, word_index: usize, content: impl Into<String>) {
        self.buffered_updates.push(BufferedUpdate { word_index, content: content.into() });
    }

    /// The filename this session is locked on.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The sentence index this session was opened with (pre-shift).
    #[must_use]
    pub fn requested_sentence_index(&self) -> i64 {
        self.requested_sentence_index
    }

    /// Phase 3: commits the session's buffered updates atomically
    /// under the file-commit lock, then releases the sentence lock
    /// unconditionally, on success or on error.
    pub fn commit(
        self,
        store: &FileStore,
        file_locks: &FileLocks,
        mod_log: &ModLog,
        sentence_locks: &SentenceLocks,
    ) -> Result<ContentStats, WireError> {
        let result = commit_locked(&self, store, file_locks, mod_log);
        sentence_locks.unlock(&self.filename, self.requested_sentence_index);
        result
    }
}

fn commit_locked(
    session: &WriteSession,
    store: &FileStore,
    file_locks: &FileLocks,
    mod_log: &ModLog,
) -> Result<ContentStats, WireError> {
    let commit_lock = file_locks.get(&session.filename);
    let _guard = commit_lock.lock().map_err(|_| StorageError::LockPoisoned)?;

    store.backup(&session.filename)?;

    let mut content = if store.exists(&session.filename) {
        store.read_to_string(&session.filename)?
    } else {
        String::new()
    };
    let count_before = tok::split_into_sentences(&content).len() as i64;

    let shift = mod_log.shift_for(
        &session.filename,
        session.session_start_log_id,
        session.requested_sentence_index,
    );
    let real_sentence_index = session.requested_sentence_index + shift;

    for update in &session.buffered_updates {
        content = apply_buffered_update(&content, real_sentence_index, update)?;
    }

    store.write(&session.filename, &content)?;

    let count_after = tok::split_into_sentences(&content).len() as i64;
    let delta = count_after - count_before;
    if delta != 0 {
        mod_log.append(&session.filename, real_sentence_index, delta);
    }

    Ok(ContentStats::of(&content))
}

/// Applies one buffered update to `content` against the session's
/// fixed `real_sentence_index`, re-tokenizing the whole document
/// before and after so that a delimiter newly introduced by the
/// splice creates a fresh sentence boundary. This is how a single
/// write session can grow the sentence count.
fn apply_buffered_update(
    content: &str,
    real_sentence_index: i64,
    update: &BufferedUpdate,
) -> Result<String, WireError> {
    let mut sentences = tok::split_into_sentences(content);
    let index = usize::try_from(real_sentence_index)
        .map_err(|_| WireError::internal("sentence index shifted negative"))?;

    if index == sentences.len() {
        sentences.push(String::new());
    } else if index > sentences.len() {
        return Err(WireError::internal("sentence index out of range at commit"));
    }

    let mut words = tok::split_into_words(&sentences[index]);
    if update.word_index > words.len() {
        return Err(StorageError::WordIndexOutOfRange(update.word_index, words.len()).into());
    }

    let inserted = tok::split_into_words(&update.content);
    words.splice(update.word_index..update.word_index, inserted);
    sentences[index] = tok::join_words(&words);

    Ok(tok::join_sentences(&sentences))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        (dir, store)
    }

    /// Basic write into an empty file.
    #[test]
    fn basic_write_into_empty_file() {
        let (_dir, store) = store();
        store.create_empty("a.txt").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut session = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        session.buffer(0, "hello world.");
        let stats = session.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();

        assert_eq!(store.read_to_string("a.txt").unwrap(), "hello world.");
        assert_eq!(stats.size, 12);
        assert_eq!(stats.word_count, 3);
        assert_eq!(stats.char_count, 12);
        assert!(!sentence_locks.is_locked("a.txt", 0));
    }

    /// Appending a second sentence.
    #[test]
    fn append_second_sentence() {
        let (_dir, store) = store();
        store.write("a.txt", "hello world.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut session = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 1).unwrap();
        session.buffer(0, "bye.");
        session.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();

        assert_eq!(store.read_to_string("a.txt").unwrap(), "hello world. bye.");
    }

    /// Concurrent same-sentence lock.
    #[test]
    fn concurrent_same_sentence_lock_is_rejected() {
        let (_dir, store) = store();
        store.write("a.txt", "hello world.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let mod_log = ModLog::new();

        let _first = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        let second = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0);
        assert!(matches!(second, Err(WireError::Locked(_))));
    }

    /// Shift correctness: a writer's session-start snapshot must
    /// absorb a sentence insertion that commits ahead of it.
    #[test]
    fn commit_order_shifts_a_pending_session_index() {
        let (_dir, store) = store();
        store.write("a.txt", "A. B. C.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut writer_x = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 2).unwrap();
        writer_x.buffer(0, "!");

        let mut writer_y = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        writer_y.buffer(0, "start.");
        writer_y.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();
        assert_eq!(store.read_to_string("a.txt").unwrap(), "start. A. B. C.");

        writer_x.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();
        assert_eq!(store.read_to_string("a.txt").unwrap(), "start. A. B. ! C.");
    }

    /// Undo rewinds the whole session, not individual updates.
    #[test]
    fn undo_rewinds_the_whole_write_session() {
        let (_dir, store) = store();
        store.write("a.txt", "hello world.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut session = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        session.buffer(0, "a");
        session.buffer(0, "b");
        session.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();
        assert_ne!(store.read_to_string("a.txt").unwrap(), "hello world.");

        store.restore_undo("a.txt").unwrap();
        assert_eq!(store.read_to_string("a.txt").unwrap(), "hello world.");
    }

    #[test]
    fn out_of_range_sentence_index_is_rejected_at_open() {
        let (_dir, store) = store();
        store.write("a.txt", "hello world.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let mod_log = ModLog::new();
        let result = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 5);
        assert!(matches!(result, Err(WireError::BadRequest(_))));
    }

    #[test]
    fn out_of_range_word_index_fails_commit_as_internal_error() {
        let (_dir, store) = store();
        store.write("a.txt", "hello world.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut session = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        session.buffer(99, "oops");
        let result = session.commit(&store, &file_locks, &mod_log, &sentence_locks);
        assert!(matches!(result, Err(WireError::Internal(_))));
        assert!(!sentence_locks.is_locked("a.txt", 0));
    }

    #[test]
    fn sentence_lock_released_on_commit_error() {
        let (_dir, store) = store();
        store.write("a.txt", "hello world.").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut session = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        session.buffer(99, "oops");
        let _ = session.commit(&store, &file_locks, &mod_log, &sentence_locks);
        // A fresh session against the same sentence must now succeed.
        assert!(WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).is_ok());
    }

    /// Invariant 3: the log's deltas for a file sum to its net
    /// sentence-count change since creation.
    #[test]
    fn mod_log_deltas_sum_to_net_sentence_count_change() {
        let (_dir, store) = store();
        store.create_empty("a.txt").unwrap();
        let sentence_locks = SentenceLocks::new();
        let file_locks = FileLocks::new();
        let mod_log = ModLog::new();

        let mut s1 = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 0).unwrap();
        s1.buffer(0, "A.");
        s1.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();

        let mut s2 = WriteSession::open(&store, &sentence_locks, &mod_log, "a.txt", 1).unwrap();
        s2.buffer(0, "B.");
        s2.commit(&store, &file_locks, &mod_log, &sentence_locks).unwrap();

        let final_count = tok::split_into_sentences(&store.read_to_string("a.txt").unwrap()).len() as i64;
        assert_eq!(mod_log.total_delta_for("a.txt"), final_count);
    }
}

//! File bytes on disk, plus the single-shot `.undo` backup sidecar.

use std::fs;
use std::path::{Path, PathBuf};

use scribe_core::Filename;

use crate::error::StorageError;

/// Stats reported after a successful write or undo, folded straight
/// into an `INFO_UPDATE` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentStats {
    pub size: u64,
    pub word_count: u64,
    pub char_count: u64,
}

impl ContentStats {
    /// Computes size/word/char stats for `content`. Word count uses the
    /// same delimiter-as-own-word rule as the sentence editor, applied
    /// to the whole file rather than sentence-by-sentence (the two
    /// agree since sentence boundaries never change how whitespace or
    /// delimiters tokenize).
    #[must_use]
    pub fn of(content: &str) -> Self {
        Self {
            size: content.len() as u64,
            word_count: scribe_tokenizer::split_into_words(content).len() as u64,
            char_count: content.chars().count() as u64,
        }
    }
}

/// Plain-text files for one storage server, rooted at a single
/// directory on disk. Every file lives directly under `root`; a
/// sibling `<file>.undo` holds the most recent pre-commit backup, if
/// any.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (creating if necessary) a file store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Validates `filename` against the shared naming invariant and
    /// joins it to `root`. Every other method routes through here (or
    /// [`FileStore::undo_path`]) so no unvalidated filename ever
    /// reaches the filesystem.
    fn path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = Filename::new(filename).map_err(|e| StorageError::InvalidFilename(e.to_string()))?;
        Ok(self.root.join(name.as_str()))
    }

    fn undo_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = Filename::new(filename).map_err(|e| StorageError::InvalidFilename(e.to_string()))?;
        Ok(self.root.join(format!("{}.undo", name.as_str())))
    }

    /// Whether `filename` exists on disk. An invalid filename is
    /// treated the same as a missing one.
    #[must_use]
    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Reads the full content of `filename` as text.
    pub fn read_to_string(&self, filename: &str) -> Result<String, StorageError> {
        fs::read_to_string(self.path(filename)?).map_err(|_| StorageError::FileNotFound(filename.to_string()))
    }

    /// Reads the full content of `filename` as raw bytes (used by
    /// `READ`/`GET_CONTENT`, which do not assume UTF-8).
    pub fn read_bytes(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.path(filename)?).map_err(|_| StorageError::FileNotFound(filename.to_string()))
    }

    /// Overwrites `filename` with `content` (truncate-and-write, never
    /// in-place).
    pub fn write(&self, filename: &str, content: &str) -> Result<(), StorageError> {
        fs::write(self.path(filename)?, content)?;
        Ok(())
    }

    /// Creates `filename` empty if it does not already exist.
    pub fn create_empty(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.path(filename)?;
        if !path.exists() {
            fs::write(path, "")?;
        }
        Ok(())
    }

    /// Removes `filename` and any undo backup for it.
    pub fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.path(filename)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        let undo = self.undo_path(filename)?;
        if undo.exists() {
            fs::remove_file(undo)?;
        }
        Ok(())
    }

    /// Copies the current bytes of `filename` to its `.undo` sidecar.
    /// A no-op, not an error, if `filename` does not yet exist.
    pub fn backup(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.path(filename)?;
        if !path.exists() {
            return Ok(());
        }
        fs::copy(&path, self.undo_path(filename)?)?;
        Ok(())
    }

    /// Whether `filename` has a pending single-shot undo available.
    /// An invalid filename is treated the same as no undo available.
    #[must_use]
    pub fn has_undo(&self, filename: &str) -> bool {
        self.undo_path(filename).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Restores `filename` from its `.undo` sidecar, consuming the
    /// backup (undo is single-shot: after this call, another `UNDO`
    /// on the same file fails until a new write creates a fresh
    /// backup).
    pub fn restore_undo(&self, filename: &str) -> Result<(), StorageError> {
        let undo = self.undo_path(filename)?;
        if !undo.is_file() {
            return Err(StorageError::NoUndoAvailable(filename.to_string()));
        }
        fs::rename(undo, self.path(filename)?)?;
        Ok(())
    }

    /// Lists the plain files resident on this server (excludes `.undo`
    /// sidecars), as advertised in `INIT_SS`.
    pub fn list_files(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".undo") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// The directory this store is rooted at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.write("a.txt", "hello world.").unwrap();
        assert_eq!(store.read_to_string("a.txt").unwrap(), "hello world.");
    }

    #[test]
    fn backup_is_a_no_op_when_file_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.backup("missing.txt").unwrap();
        assert!(!store.has_undo("missing.txt"));
    }

    #[test]
    fn restore_undo_is_single_shot() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.write("a.txt", "before").unwrap();
        store.backup("a.txt").unwrap();
        store.write("a.txt", "after").unwrap();

        store.restore_undo("a.txt").unwrap();
        assert_eq!(store.read_to_string("a.txt").unwrap(), "before");
        assert!(!store.has_undo("a.txt"));
        assert!(store.restore_undo("a.txt").is_err());
    }

    #[test]
    fn delete_removes_file_and_undo_sidecar() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.write("a.txt", "x").unwrap();
        store.backup("a.txt").unwrap();
        store.delete("a.txt").unwrap();
        assert!(!store.exists("a.txt"));
        assert!(!store.has_undo("a.txt"));
    }

    #[test]
    fn list_files_excludes_undo_sidecars() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.write("a.txt", "x").unwrap();
        store.backup("a.txt").unwrap();
        store.write("b.txt", "y").unwrap();
        assert_eq!(store.list_files().unwrap(), vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn content_stats_count_words_with_delimiters() {
        let stats = ContentStats::of("hello world.");
        assert_eq!(stats.size, 12);
        assert_eq!(stats.word_count, 3);
        assert_eq!(stats.char_count, 12);
    }
}

//! The name server's file metadata table: a hash table keyed by
//! filename, with a filename trie kept alongside it as a secondary
//! index.
//!
//! One table-wide lock guards insert/remove/iterate (structural
//! changes); each entry then has its own mutex so a stat refresh on
//! one file never blocks a lookup of another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::metadata::FileMetadata;
use crate::trie::FilenameTrie;

/// A handle to one file's metadata, shared and independently
/// lockable.
pub type MetadataHandle = Arc<Mutex<FileMetadata>>;

/// The name server's metadata store.
#[derive(Default)]
pub struct FileTable {
    entries: RwLock<HashMap<String, MetadataHandle>>,
    trie: Mutex<FilenameTrie>,
}

impl FileTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created file's metadata. Callers must check
    /// [`FileTable::contains`] first; `CREATE`'s `409` on an existing
    /// file is enforced by the dispatch layer, not here.
    pub fn insert(&self, metadata: FileMetadata) {
        let filename = metadata.filename.clone();
        self.entries.write().expect("file table lock poisoned").insert(filename.clone(), Arc::new(Mutex::new(metadata)));
        self.trie.lock().expect("filename trie lock poisoned").insert(&filename);
    }

    /// Removes `filename`'s metadata. Returns whether it was present.
    pub fn remove(&self, filename: &str) -> bool {
        let removed = self.entries.write().expect("file table lock poisoned").remove(filename).is_some();
        if removed {
            self.trie.lock().expect("filename trie lock poisoned").remove(filename);
        }
        removed
    }

    /// Looks up a lockable handle to `filename`'s metadata.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<MetadataHandle> {
        self.entries.read().expect("file table lock poisoned").get(filename).cloned()
    }

    /// Whether `filename` is known to this table.
    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.entries.read().expect("file table lock poisoned").contains_key(filename)
    }

    /// A point-in-time clone of every file's metadata, for `VIEW`.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FileMetadata> {
        self.entries
            .read()
            .expect("file table lock poisoned")
            .values()
            .map(|handle| handle.lock().expect("metadata entry lock poisoned").clone())
            .collect()
    }

    /// Rewrites the storage-server location for every tracked file
    /// whose name appears in `advertised_files`, as performed during
    /// `INIT_SS` reconciliation. Returns the subset of
    /// `advertised_files` that were *not* known to this table: the
    /// orphans.
    pub fn reconcile_ss_location(&self, advertised_files: &[String], ip: &str, client_port: u16) -> Vec<String> {
        let entries = self.entries.read().expect("file table lock poisoned");
        let mut orphans = Vec::new();
        for filename in advertised_files {
            match entries.get(filename) {
                Some(handle) => {
                    let mut metadata = handle.lock().expect("metadata entry lock poisoned");
                    metadata.ss_ip = ip.to_string();
                    metadata.ss_client_port = client_port;
                }
                None => orphans.push(filename.clone()),
            }
        }
        orphans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_file_is_contained_and_retrievable() {
        let table = FileTable::new();
        table.insert(FileMetadata::new("a.txt", "alice", "127.0.0.1", 9001));
        assert!(table.contains("a.txt"));
        assert_eq!(table.get("a.txt").unwrap().lock().unwrap().owner, "alice");
    }

    #[test]
    fn removed_file_is_no_longer_contained() {
        let table = FileTable::new();
        table.insert(FileMetadata::new("a.txt", "alice", "127.0.0.1", 9001));
        assert!(table.remove("a.txt"));
        assert!(!table.contains("a.txt"));
        assert!(!table.remove("a.txt"));
    }

    #[test]
    fn reconciliation_updates_known_files_and_reports_orphans() {
        let table = FileTable::new();
        table.insert(FileMetadata::new("x.txt", "alice", "10.0.0.1", 9001));

        let orphans = table.reconcile_ss_location(&["x.txt".to_string(), "y.txt".to_string()], "10.0.0.2", 9050);

        assert_eq!(orphans, vec!["y.txt".to_string()]);
        assert_eq!(table.get("x.txt").unwrap().lock().unwrap().ss_ip, "10.0.0.2");
        assert!(!table.contains("y.txt"));
    }
}

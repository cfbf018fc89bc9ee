//! The name server's shared, process-wide state: everything a
//! connection handler thread needs, wrapped so it's cheap to clone
//! and hand to a new worker thread under the thread-per-connection
//! model.

use std::path::PathBuf;
use std::sync::Arc;

use crate::info_cache::InfoCache;
use crate::persistence;
use crate::registry::SsRegistry;
use crate::table::FileTable;
use crate::users::UserRegistry;

/// Where persisted state lives on disk.
#[derive(Debug, Clone)]
pub struct PersistencePaths {
    pub users_path: PathBuf,
    pub files_path: PathBuf,
}

/// The name server's in-memory state, shared across every connection
/// handler via `Arc`.
pub struct NameServerState {
    pub table: FileTable,
    pub users: UserRegistry,
    pub ss_registry: SsRegistry,
    pub info_cache: InfoCache,
    pub persistence: PersistencePaths,
}

impl NameServerState {
    /// Loads persisted users and files from `persistence`, building a
    /// fresh in-memory state.
    pub fn load(persistence: PersistencePaths) -> Result<Arc<Self>, crate::error::NameServerError> {
        let table = FileTable::new();
        for metadata in persistence::load_files(&persistence.files_path)? {
            table.insert(metadata);
        }

        let users = UserRegistry::new();
        users.load(persistence::load_users(&persistence.users_path)?);

        Ok(Arc::new(Self { table, users, ss_registry: SsRegistry::new(), info_cache: InfoCache::new(), persistence }))
    }

    /// Persists the current users and files snapshots to disk. Called
    /// after every mutation of either store; failures are logged, not
    /// propagated, so a disk hiccup never fails the client's request
    /// (the in-memory state is already correct).
    pub fn persist(&self) {
        if let Err(error) = persistence::save_users(&self.persistence.users_path, &self.users.all()) {
            tracing::warn!(%error, "failed to persist users store");
        }
        if let Err(error) = persistence::save_files(&self.persistence.files_path, &self.table.snapshot()) {
            tracing::warn!(%error, "failed to persist files store");
        }
    }
}

//! A file's metadata record, owned by the name server: the access
//! list, cached stats, and the storage server currently holding the
//! authoritative bytes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// `'R'` or `'W'`, as granted to a non-owner user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    Read,
    Write,
}

/// The insertion-ordered list of non-owner grants on a file. The
/// owner's implicit `'W'` is never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessList {
    entries: Vec<(String, Permission)>,
}

impl AccessList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `permission` to `user`, idempotently: a repeat call
    /// updates the existing entry rather than duplicating it.
    pub fn grant(&mut self, user: &str, permission: Permission) {
        if let Some(entry) = self.entries.iter_mut().find(|(u, _)| u == user) {
            entry.1 = permission;
        } else {
            self.entries.push((user.to_string(), permission));
        }
    }

    /// Removes any grant for `user`. A no-op if absent.
    pub fn revoke(&mut self, user: &str) {
        self.entries.retain(|(u, _)| u != user);
    }

    /// The permission explicitly granted to `user`, if any.
    #[must_use]
    pub fn get(&self, user: &str) -> Option<Permission> {
        self.entries.iter().find(|(u, _)| u == user).map(|(_, p)| *p)
    }

    /// Iterates grants in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, Permission)> {
        self.entries.iter()
    }
}

/// One existing file's metadata, as owned by the name server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub owner: String,
    pub access_list: AccessList,
    pub ss_ip: String,
    pub ss_client_port: u16,
    pub size: u64,
    pub word_count: u64,
    pub char_count: u64,
    pub created_at: u64,
    pub last_modified: u64,
    pub last_accessed: u64,
}

impl FileMetadata {
    /// Creates a freshly registered file owned by `owner`, located on
    /// the storage server at `ss_ip:ss_client_port`.
    #[must_use]
    pub fn new(filename: impl Into<String>, owner: impl Into<String>, ss_ip: impl Into<String>, ss_client_port: u16) -> Self {
        let now = now_secs();
        Self {
            filename: filename.into(),
            owner: owner.into(),
            access_list: AccessList::new(),
            ss_ip: ss_ip.into(),
            ss_client_port,
            size: 0,
            word_count: 0,
            char_count: 0,
            created_at: now,
            last_modified: now,
            last_accessed: now,
        }
    }

    /// Whether `user` may perform an operation requiring `required`
    /// (`'R'` or `'W'`): the owner always may; a non-owner needs an
    /// exact `'W'` grant, or any grant at all when only `'R'` is
    /// required.
    #[must_use]
    pub fn check_access(&self, user: &str, required: Permission) -> bool {
        if user == self.owner {
            return true;
        }
        match self.access_list.get(user) {
            Some(Permission::Write) => true,
            Some(Permission::Read) => required == Permission::Read,
            None => false,
        }
    }

    /// Applies a fresh `INFO_UPDATE` stat refresh.
    pub fn apply_stats(&mut self, size: u64, word_count: u64, char_count: u64) {
        self.size = size;
        self.word_count = word_count;
        self.char_count = char_count;
        self.last_modified = now_secs();
    }

    /// Marks the file as accessed right now.
    pub fn touch_accessed(&mut self) {
        self.last_accessed = now_secs();
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

//! The set of all users ever seen, guarded by a single mutex: every
//! operation here is point-in-time and never nested.

use std::collections::BTreeSet;
use std::sync::Mutex;

/// Every username the name server has ever accepted an `INIT_CLIENT`
/// from. Clients are authenticated by assertion only, with no
/// password or token exchange; this registry exists for `LIST` and
/// for crediting file ownership to a real, previously seen identity.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: Mutex<BTreeSet<String>>,
}

impl UserRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `username` as seen. A no-op if already known.
    pub fn record(&self, username: &str) {
        self.users.lock().expect("user registry mutex poisoned").insert(username.to_string());
    }

    /// All known usernames, in sorted order.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        self.users.lock().expect("user registry mutex poisoned").iter().cloned().collect()
    }

    /// Replaces the registry's contents, used when loading persisted
    /// state at startup.
    pub fn load(&self, users: impl IntoIterator<Item = String>) {
        let mut guard = self.users.lock().expect("user registry mutex poisoned");
        guard.clear();
        guard.extend(users);
    }
}

//! A small bounded, recency-eviction cache of rendered `INFO`
//! response bodies.
//!
//! The original's `lru_get`/`lru_put` call sites in `handle_info` exist
//! but are stubbed no-ops there; this implementation realizes them.
//! `N = 64` entries, evicted least-recently-used, invalidated on
//! `ADDACCESS`/`REMACCESS`/`INFO_UPDATE`/`DELETE` since each of those
//! changes what an `INFO` reply for the affected file should say.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Bounded entry count; see module docs.
const CAPACITY: usize = 64;

#[derive(Default)]
struct State {
    bodies: HashMap<String, String>,
    recency: VecDeque<String>,
}

/// A cache from filename to its rendered `INFO` body.
#[derive(Default)]
pub struct InfoCache {
    state: Mutex<State>,
}

impl InfoCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a cached `INFO` body for `filename`, marking it most
    /// recently used on a hit.
    pub fn get(&self, filename: &str) -> Option<String> {
        let mut state = self.state.lock().expect("info cache lock poisoned");
        let body = state.bodies.get(filename).cloned()?;
        state.recency.retain(|f| f != filename);
        state.recency.push_back(filename.to_string());
        Some(body)
    }

    /// Caches `body` for `filename`, evicting the least-recently-used
    /// entry if this insertion exceeds [`CAPACITY`].
    pub fn put(&self, filename: &str, body: String) {
        let mut state = self.state.lock().expect("info cache lock poisoned");
        if !state.bodies.contains_key(filename) && state.bodies.len() >= CAPACITY {
            if let Some(oldest) = state.recency.pop_front() {
                state.bodies.remove(&oldest);
            }
        }
        state.recency.retain(|f| f != filename);
        state.recency.push_back(filename.to_string());
        state.bodies.insert(filename.to_string(), body);
    }

    /// Invalidates any cached entry for `filename`.
    pub fn invalidate(&self, filename: &str) {
        let mut state = self.state.lock().expect("info cache lock poisoned");
        state.bodies.remove(filename);
        state.recency.retain(|f| f != filename);
    }
}

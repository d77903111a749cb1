//! Directory store
//!
//! Holds the currently published snapshot behind a single swappable
//! reference. `publish` is the only write and happens exactly once per
//! successful reconciliation cycle; readers see either the prior snapshot
//! or the fully new one, never a torn state. Lookups never block on
//! validation.

use guilddir_common::{DirectoryRecord, Snapshot};
use std::sync::{Arc, RwLock};

#[derive(Default)]
pub struct DirectoryStore {
    active: RwLock<Option<Arc<Snapshot>>>,
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the active snapshot
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut active = self.active.write().expect("directory store lock poisoned");
        *active = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Currently published snapshot, if any cycle has completed yet
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.active
            .read()
            .expect("directory store lock poisoned")
            .clone()
    }

    /// Case-insensitive lookup by keyword, display name, or alias.
    /// Never errors; unknown names (and the pre-publish state) yield `None`.
    pub fn lookup(&self, name: &str) -> Option<DirectoryRecord> {
        self.snapshot().and_then(|s| s.lookup(name).cloned())
    }
}

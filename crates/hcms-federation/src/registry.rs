//! Remote Registry Store
//!
//! In-memory mapping from module key to connection descriptor.

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use hcms_core::RemoteDescriptor;

/// In-memory remote registry, ordered by first insertion.
///
/// The registry is the single owner of descriptors; callers only ever receive
/// cloned snapshots. The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct RemoteRegistry {
    entries: RwLock<IndexMap<String, RemoteDescriptor>>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `descriptor` under `key`, replacing any previous descriptor.
    ///
    /// A replaced key keeps its original position. Returns the previous descriptor.
    pub fn set(&self, key: impl Into<String>, descriptor: RemoteDescriptor) -> Option<RemoteDescriptor> {
        let key = key.into();
        debug!(
            key = %key,
            route_path = %descriptor.route_path,
            origin = %descriptor.origin,
            "Registering remote module"
        );
        self.entries.write().insert(key, descriptor)
    }

    /// Looks up a descriptor by key.
    pub fn get(&self, key: &str) -> Option<RemoteDescriptor> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Snapshot of all descriptors in insertion order.
    pub fn list(&self) -> Vec<RemoteDescriptor> {
        self.entries.read().values().cloned().collect()
    }

    /// Snapshot of all registered keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

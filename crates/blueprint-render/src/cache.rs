//! Compiled blueprint cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::ir::Blueprint;

/// Compiled blueprints keyed by catalog key.
///
/// Shared by every render that goes through the owning resolver. Two renders
/// compiling the same key at once both do the work, but only the first result
/// is stored and both end up with that instance.
#[derive(Debug, Default)]
pub struct CompiledCache {
    entries: RwLock<HashMap<String, Arc<Blueprint>>>,
}

impl CompiledCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Blueprint>> {
        self.entries.read().get(key).cloned()
    }

    /// Stores `compiled` unless the key is already present, and returns the
    /// stored instance either way.
    pub fn insert_if_absent(&self, key: &str, compiled: Arc<Blueprint>) -> Arc<Blueprint> {
        self.entries
            .write()
            .entry(key.to_string())
            .or_insert(compiled)
            .clone()
    }

    /// Drops one entry. Returns true if it was cached.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

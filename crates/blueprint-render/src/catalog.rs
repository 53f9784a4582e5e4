//! Named blueprint registries.
//!
//! A [`BlueprintCatalog`] maps string keys to raw (untransformed) blueprints.
//! Two implementations are provided:
//!
//! - [`InMemoryCatalog`]: a plain registry
//! - [`OverlayCatalog`]: a local registry layered in front of a base catalog
//!
//! # Overlays
//!
//! Lookups check the overlay's own entries first and fall back to the base on
//! a miss. Registration only ever writes to the overlay, so a request- or
//! tenant-scoped catalog can shadow a shared one without copying or mutating
//! it:
//!
//! ```rust
//! use std::sync::Arc;
//! use blueprint_render::{Blueprint, BlueprintCatalog, InMemoryCatalog, OverlayCatalog};
//!
//! let base = Arc::new(InMemoryCatalog::new());
//! base.register("footer", Blueprint::text("(c) Acme"));
//! base.register("header", Blueprint::text("Acme"));
//!
//! let tenant = OverlayCatalog::new(base.clone());
//! tenant.register("header", Blueprint::text("Tenant Ltd"));
//!
//! assert_eq!(*tenant.resolve("header").unwrap(), Blueprint::text("Tenant Ltd"));
//! assert_eq!(*tenant.resolve("footer").unwrap(), Blueprint::text("(c) Acme"));
//! assert_eq!(*base.resolve("header").unwrap(), Blueprint::text("Acme"));
//! ```
//!
//! # Thread Safety
//!
//! Catalogs are `Send + Sync` and lookups may run concurrently. Registration
//! is a bootstrap operation: registering while renders are in flight is memory
//! safe, but a resolver that already compiled the key keeps serving its cached
//! result until [`CompiledCache::invalidate`](crate::CompiledCache::invalidate)
//! is called.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{RenderError, Result};
use crate::ir::Blueprint;

/// A named registry of blueprints.
pub trait BlueprintCatalog: Debug + Send + Sync {
    /// Looks up a blueprint.
    ///
    /// Fails with [`RenderError::NotFound`] for unregistered keys.
    fn resolve(&self, key: &str) -> Result<Arc<Blueprint>>;

    /// Registers (or replaces) a blueprint.
    fn register(&self, key: &str, blueprint: Blueprint);

    /// Returns true if `key` resolves.
    fn contains(&self, key: &str) -> bool;

    /// All resolvable keys.
    fn keys(&self) -> Vec<String>;
}

/// In-memory [`BlueprintCatalog`]. Entries never expire.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: RwLock<IndexMap<String, Arc<Blueprint>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint, returning the catalog.
    pub fn with(self, key: impl Into<String>, blueprint: Blueprint) -> Self {
        self.entries.write().insert(key.into(), Arc::new(blueprint));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Blueprint)> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = (K, Blueprint)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, bp)| (k.into(), Arc::new(bp)))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl BlueprintCatalog for InMemoryCatalog {
    fn resolve(&self, key: &str) -> Result<Arc<Blueprint>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| RenderError::NotFound {
                key: key.to_string(),
            })
    }

    fn register(&self, key: &str, blueprint: Blueprint) {
        self.entries
            .write()
            .insert(key.to_string(), Arc::new(blueprint));
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

/// A local registry layered in front of a base catalog.
#[derive(Debug)]
pub struct OverlayCatalog {
    local: InMemoryCatalog,
    base: Arc<dyn BlueprintCatalog>,
}

impl OverlayCatalog {
    pub fn new(base: Arc<dyn BlueprintCatalog>) -> Self {
        Self {
            local: InMemoryCatalog::new(),
            base,
        }
    }

    /// The overlay's own entries.
    pub fn local(&self) -> &InMemoryCatalog {
        &self.local
    }

    pub fn base(&self) -> &Arc<dyn BlueprintCatalog> {
        &self.base
    }
}

impl BlueprintCatalog for OverlayCatalog {
    fn resolve(&self, key: &str) -> Result<Arc<Blueprint>> {
        match self.local.resolve(key) {
            Err(RenderError::NotFound { .. }) => self.base.resolve(key),
            found => found,
        }
    }

    fn register(&self, key: &str, blueprint: Blueprint) {
        self.local.register(key, blueprint);
    }

    fn contains(&self, key: &str) -> bool {
        self.local.contains(key) || self.base.contains(key)
    }

    /// Local keys first, then base keys not shadowed locally.
    fn keys(&self) -> Vec<String> {
        let mut keys = self.local.keys();
        for key in self.base.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

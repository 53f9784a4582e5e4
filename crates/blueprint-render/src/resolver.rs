//! Key to compiled blueprint resolution.
//!
//! ```text
//! key
//!   → cache hit?  → return cached instance
//!   → mark key in progress (cycle check)
//!   → catalog lookup
//!   → transformer chain
//!   → walk constant include targets (cycle check)
//!   → insert-if-absent into the cache
//!   → release key
//! ```
//!
//! The in-progress marker lives on the execution's
//! [`ResolutionStack`](crate::ResolutionStack), so two renders compiling the
//! same key on different threads never see each other as a cycle.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::cache::CompiledCache;
use crate::catalog::BlueprintCatalog;
use crate::error::{RenderError, Result};
use crate::execution::RenderingExecution;
use crate::ir::Blueprint;
use crate::transform::{TransformPass, TransformerChain};

/// Resolves catalog keys to compiled, cached blueprints.
#[derive(Debug)]
pub struct BlueprintResolver {
    catalog: Arc<dyn BlueprintCatalog>,
    transformers: TransformerChain,
    cache: CompiledCache,
}

impl BlueprintResolver {
    /// Creates a resolver with an empty transformer chain.
    pub fn new(catalog: Arc<dyn BlueprintCatalog>) -> Self {
        Self {
            catalog,
            transformers: TransformerChain::new(),
            cache: CompiledCache::new(),
        }
    }

    pub fn with_transformers(mut self, transformers: TransformerChain) -> Self {
        self.transformers = transformers;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn BlueprintCatalog> {
        &self.catalog
    }

    pub fn transformers(&self) -> &TransformerChain {
        &self.transformers
    }

    pub fn cache(&self) -> &CompiledCache {
        &self.cache
    }

    /// Returns the compiled blueprint for `key`.
    ///
    /// Repeated calls return the same instance until the cache entry is
    /// invalidated. Fails with `NotFound` for unknown keys and with
    /// `CircularReference` when compiling `key` requires compiling `key`, or
    /// when its constant include targets lead back to it. Missing include
    /// targets are not reported here; add [`IncludeValidator`] for that.
    ///
    /// [`IncludeValidator`]: crate::IncludeValidator
    pub fn resolve(&self, key: &str, execution: &RenderingExecution) -> Result<Arc<Blueprint>> {
        if let Some(compiled) = self.cache.get(key) {
            debug!(key, "compiled blueprint cache hit");
            return Ok(compiled);
        }

        let _guard = execution.resolution_stack().enter(key)?;
        debug!(key, transformers = self.transformers.len(), "compiling blueprint");

        let raw = self.catalog.resolve(key)?;
        let compiled = if self.transformers.is_empty() {
            raw
        } else {
            let pass = TransformPass::new(execution, self);
            Arc::new(self.transformers.apply((*raw).clone(), &pass)?)
        };

        let mut path = execution.resolution_stack().active();
        self.check_includes(&compiled, &mut path, &mut HashSet::new())?;

        Ok(self.cache.insert_if_absent(key, compiled))
    }

    /// Depth-first walk over constant include targets. `path` holds the keys
    /// leading to `blueprint`; targets already explored land in `done`.
    fn check_includes(
        &self,
        blueprint: &Blueprint,
        path: &mut Vec<String>,
        done: &mut HashSet<String>,
    ) -> Result<()> {
        for key in blueprint.constant_include_keys() {
            if path.contains(&key) {
                return Err(RenderError::CircularReference {
                    key,
                    chain: path.clone(),
                });
            }
            if done.contains(&key) {
                continue;
            }
            let target = match self.cache.get(&key) {
                Some(compiled) => compiled,
                None => match self.catalog.resolve(&key) {
                    Ok(raw) => raw,
                    Err(RenderError::NotFound { .. }) => {
                        done.insert(key);
                        continue;
                    }
                    Err(e) => return Err(e),
                },
            };
            path.push(key);
            self.check_includes(&target, path, done)?;
            if let Some(key) = path.pop() {
                done.insert(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::RenderError;
    use crate::ir::BlueprintValue;
    use crate::transform::IncludeValidator;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn exec() -> RenderingExecution {
        RenderingExecution::for_data(json!({}))
    }

    fn includes(key: &str) -> Blueprint {
        Blueprint::element("div")
            .child(Blueprint::include(key, BlueprintValue::null()))
            .build()
    }

    #[test]
    fn test_resolve_is_cached() {
        let catalog = Arc::new(InMemoryCatalog::new().with("k", Blueprint::text("x")));
        let resolver = BlueprintResolver::new(catalog);
        let e = exec();

        let first = resolver.resolve("k", &e).unwrap();
        let second = resolver.resolve("k", &e).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn test_transformers_run_once_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let chain = TransformerChain::new().add_fn(0, move |bp, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(bp)
        });
        let catalog = Arc::new(InMemoryCatalog::new().with("k", Blueprint::text("x")));
        let resolver = BlueprintResolver::new(catalog).with_transformers(chain);

        for _ in 0..3 {
            resolver.resolve("k", &exec()).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_not_found_is_not_cached() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let resolver = BlueprintResolver::new(catalog.clone());
        let e = exec();

        assert!(matches!(
            resolver.resolve("late", &e),
            Err(RenderError::NotFound { .. })
        ));
        assert!(e.resolution_stack().is_empty());

        catalog.register("late", Blueprint::text("now"));
        assert_eq!(*resolver.resolve("late", &e).unwrap(), Blueprint::text("now"));
    }

    #[test]
    fn test_compile_time_cycle() {
        let catalog = Arc::new(
            InMemoryCatalog::new()
                .with("a", includes("b"))
                .with("b", includes("a")),
        );
        let resolver = BlueprintResolver::new(catalog.clone())
            .with_transformers(TransformerChain::new().add(0, IncludeValidator));
        let e = exec();

        match resolver.resolve("a", &e) {
            Err(err @ RenderError::CircularReference { .. }) => {
                assert_eq!(err.to_string(), "circular blueprint reference: a -> b -> a");
            }
            other => panic!("expected circular reference, got {other:?}"),
        }
        assert!(e.resolution_stack().is_empty());
        assert!(resolver.cache().is_empty());

        // once the cycle is broken the same keys compile
        catalog.register("b", Blueprint::text("leaf"));
        assert!(resolver.resolve("a", &e).is_ok());
        assert!(resolver.cache().contains("b"));
    }

    #[test]
    fn test_include_cycle_without_validator() {
        let catalog = Arc::new(
            InMemoryCatalog::new()
                .with("a", includes("b"))
                .with("b", includes("c"))
                .with("c", includes("a")),
        );
        let resolver = BlueprintResolver::new(catalog);
        let e = exec();

        match resolver.resolve("a", &e) {
            Err(err @ RenderError::CircularReference { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "circular blueprint reference: a -> b -> c -> a"
                );
            }
            other => panic!("expected circular reference, got {other:?}"),
        }
        assert!(e.resolution_stack().is_empty());
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_missing_include_target_compiles_without_validator() {
        let catalog = Arc::new(
            InMemoryCatalog::new()
                .with("a", includes("b"))
                .with("b", includes("absent")),
        );
        let resolver = BlueprintResolver::new(catalog);
        assert!(resolver.resolve("a", &exec()).is_ok());
        assert!(resolver.cache().contains("a"));
        assert!(!resolver.cache().contains("b"));
    }

    #[test]
    fn test_shared_include_target_is_not_a_cycle() {
        let catalog = Arc::new(
            InMemoryCatalog::new()
                .with(
                    "page",
                    Blueprint::element("div")
                        .child(Blueprint::include("card", BlueprintValue::null()))
                        .child(Blueprint::include("card", BlueprintValue::null()))
                        .child(Blueprint::include("footer", BlueprintValue::null()))
                        .build(),
                )
                .with("footer", includes("card"))
                .with("card", Blueprint::text("card")),
        );
        let resolver = BlueprintResolver::new(catalog);
        assert!(resolver.resolve("page", &exec()).is_ok());
    }

    #[test]
    fn test_cycle_through_cached_target() {
        let catalog = Arc::new(InMemoryCatalog::new().with("a", includes("b")));
        let resolver = BlueprintResolver::new(catalog.clone());
        let e = exec();
        resolver.resolve("a", &e).unwrap();

        catalog.register("b", includes("a"));
        match resolver.resolve("b", &e) {
            Err(RenderError::CircularReference { key, chain }) => {
                assert_eq!(key, "b");
                assert_eq!(chain, vec!["b".to_string(), "a".to_string()]);
            }
            other => panic!("expected circular reference, got {other:?}"),
        }
    }

    #[test]
    fn test_self_include_cycle() {
        let catalog = Arc::new(InMemoryCatalog::new().with("self", includes("self")));
        let resolver = BlueprintResolver::new(catalog)
            .with_transformers(TransformerChain::new().add(0, IncludeValidator));
        assert!(matches!(
            resolver.resolve("self", &exec()),
            Err(RenderError::CircularReference { .. })
        ));
    }

    #[test]
    fn test_invalidate_recompiles() {
        let catalog = Arc::new(InMemoryCatalog::new().with("k", Blueprint::text("v1")));
        let resolver = BlueprintResolver::new(catalog.clone());
        let e = exec();
        resolver.resolve("k", &e).unwrap();

        catalog.register("k", Blueprint::text("v2"));
        assert_eq!(*resolver.resolve("k", &e).unwrap(), Blueprint::text("v1"));

        resolver.cache().invalidate("k");
        assert_eq!(*resolver.resolve("k", &e).unwrap(), Blueprint::text("v2"));
    }
}

//! Blueprint rewriting before materialization.
//!
//! A [`BlueprintTransformer`] takes a blueprint and returns a rewritten one.
//! The [`TransformerChain`] keeps transformers sorted by descending priority
//! and folds a blueprint through them in that order, each step receiving the
//! previous step's output:
//!
//! ```text
//! raw blueprint
//!   → transformer (priority 100)
//!   → transformer (priority 10)
//!   → transformer (priority 0)
//!   → compiled blueprint (cached by the resolver)
//! ```
//!
//! Transformers run once per key per resolver: their output is cached and
//! reused for every later render. They may read the execution that triggered
//! compilation, but the shape they produce must not depend on it or later
//! renders will see another render's output.
//!
//! # Built-in Transformers
//!
//! - [`ConstantFolder`]: replaces `Format` values whose arguments are all
//!   constants with the formatted constant
//! - [`IncludeValidator`]: compiles every constant include target up front,
//!   turning missing or circular includes into compile-time errors
//!
//! # Example
//!
//! ```rust
//! use blueprint_render::{Blueprint, TransformerChain};
//!
//! let chain = TransformerChain::new()
//!     .add_fn(0, |bp, _pass| Ok(Blueprint::element("section").child(bp).build()))
//!     .add_fn(10, |bp, _pass| Ok(Blueprint::element("article").child(bp).build()));
//!
//! // priority 10 runs first, so "section" ends up outermost
//! assert_eq!(chain.len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::execution::RenderingExecution;
use crate::ir::{Blueprint, BlueprintDirective, BlueprintPredicate, BlueprintValue};
use crate::resolve::TransformTimeResolver;
use crate::resolver::BlueprintResolver;

/// Context handed to transformers.
pub struct TransformPass<'a> {
    execution: &'a RenderingExecution,
    resolver: &'a BlueprintResolver,
}

impl<'a> TransformPass<'a> {
    pub(crate) fn new(execution: &'a RenderingExecution, resolver: &'a BlueprintResolver) -> Self {
        Self {
            execution,
            resolver,
        }
    }

    /// The execution that triggered compilation. Read-only.
    pub fn execution(&self) -> &RenderingExecution {
        self.execution
    }

    /// Compiles another blueprint through the same resolver.
    ///
    /// Re-entering a key that is still compiling fails with
    /// [`RenderError::CircularReference`](crate::RenderError::CircularReference).
    pub fn resolve(&self, key: &str) -> Result<Arc<Blueprint>> {
        self.resolver.resolve(key, self.execution)
    }
}

/// A structural rewrite applied before caching.
///
/// Implementations return a new tree; the input is consumed, never shared.
pub trait BlueprintTransformer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn transform(&self, blueprint: Blueprint, pass: &TransformPass<'_>) -> Result<Blueprint>;
}

struct FnTransformer<F>(F);

impl<F> BlueprintTransformer for FnTransformer<F>
where
    F: Fn(Blueprint, &TransformPass<'_>) -> Result<Blueprint> + Send + Sync,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn transform(&self, blueprint: Blueprint, pass: &TransformPass<'_>) -> Result<Blueprint> {
        (self.0)(blueprint, pass)
    }
}

/// Priority-ordered list of transformers.
#[derive(Clone, Default)]
pub struct TransformerChain {
    steps: Vec<(i32, Arc<dyn BlueprintTransformer>)>,
}

impl TransformerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transformer. Higher priorities run first; equal priorities run
    /// in insertion order.
    pub fn add<T: BlueprintTransformer + 'static>(mut self, priority: i32, transformer: T) -> Self {
        self.insert(priority, Arc::new(transformer));
        self
    }

    /// Adds a closure as a transformer.
    pub fn add_fn<F>(self, priority: i32, f: F) -> Self
    where
        F: Fn(Blueprint, &TransformPass<'_>) -> Result<Blueprint> + Send + Sync + 'static,
    {
        self.add(priority, FnTransformer(f))
    }

    fn insert(&mut self, priority: i32, transformer: Arc<dyn BlueprintTransformer>) {
        let pos = self
            .steps
            .iter()
            .position(|(p, _)| *p < priority)
            .unwrap_or(self.steps.len());
        self.steps.insert(pos, (priority, transformer));
    }

    /// Runs every transformer in order.
    pub fn apply(&self, blueprint: Blueprint, pass: &TransformPass<'_>) -> Result<Blueprint> {
        self.steps
            .iter()
            .try_fold(blueprint, |current, (priority, transformer)| {
                debug!(transformer = transformer.name(), priority, "applying transformer");
                transformer.transform(current, pass)
            })
    }

    /// Priorities in execution order.
    pub fn priorities(&self) -> Vec<i32> {
        self.steps.iter().map(|(p, _)| *p).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for TransformerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|(p, t)| (p, t.name())))
            .finish()
    }
}

/// Folds constant `Format` values.
///
/// A format whose arguments are all constants (or constant formats) becomes a
/// single constant string. Formats that fail to format are left alone so the
/// error surfaces at render time, only if the value is actually rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFolder;

impl ConstantFolder {
    fn value(&self, value: BlueprintValue) -> BlueprintValue {
        match value {
            BlueprintValue::Format { pattern, args } => {
                let args: Vec<_> = args.into_iter().map(|a| self.value(a)).collect();
                let format = BlueprintValue::Format { pattern, args };
                match TransformTimeResolver.fold(&format) {
                    Ok(Some(folded)) => BlueprintValue::Constant { value: folded },
                    _ => format,
                }
            }
            other => other,
        }
    }

    fn predicate(&self, predicate: BlueprintPredicate) -> BlueprintPredicate {
        use BlueprintPredicate as P;
        match predicate {
            P::BooleanValue { value } => P::BooleanValue {
                value: self.value(value),
            },
            P::Present { value } => P::Present {
                value: self.value(value),
            },
            P::Equality { left, right } => P::Equality {
                left: self.value(left),
                right: self.value(right),
            },
            P::Not { inner } => P::Not {
                inner: Box::new(self.predicate(*inner)),
            },
            P::All { predicates } => P::All {
                predicates: predicates.into_iter().map(|p| self.predicate(p)).collect(),
            },
            P::Any { predicates } => P::Any {
                predicates: predicates.into_iter().map(|p| self.predicate(p)).collect(),
            },
            P::Contains { collection, value } => P::Contains {
                collection: self.value(collection),
                value: self.value(value),
            },
        }
    }

    fn directive(&self, directive: BlueprintDirective) -> BlueprintDirective {
        use BlueprintDirective as D;
        match directive {
            D::SetAttributeIf {
                predicate,
                name,
                value,
            } => D::SetAttributeIf {
                predicate: self.predicate(predicate),
                name,
                value: self.value(value),
            },
            D::RemoveAttributeIf { predicate, name } => D::RemoveAttributeIf {
                predicate: self.predicate(predicate),
                name,
            },
            D::AddClassIf { predicate, class } => D::AddClassIf {
                predicate: self.predicate(predicate),
                class,
            },
            D::WrapIf {
                predicate,
                tag,
                attributes,
            } => D::WrapIf {
                predicate: self.predicate(predicate),
                tag,
                attributes: attributes
                    .into_iter()
                    .map(|(k, v)| (k, self.value(v)))
                    .collect(),
            },
            D::OmitIf { predicate } => D::OmitIf {
                predicate: self.predicate(predicate),
            },
        }
    }

    fn blueprints(&self, blueprints: Vec<Blueprint>) -> Vec<Blueprint> {
        blueprints.into_iter().map(|b| self.fold(b)).collect()
    }

    /// Folds a whole tree.
    pub fn fold(&self, blueprint: Blueprint) -> Blueprint {
        match blueprint {
            Blueprint::Element {
                tag,
                attributes,
                children,
                directives,
            } => Blueprint::Element {
                tag,
                attributes: attributes
                    .into_iter()
                    .map(|(k, v)| (k, self.value(v)))
                    .collect(),
                children: self.blueprints(children),
                directives: directives.into_iter().map(|d| self.directive(d)).collect(),
            },
            Blueprint::Text { value } => Blueprint::Text {
                value: self.value(value),
            },
            Blueprint::Conditional {
                predicate,
                when_true,
                when_false,
            } => Blueprint::Conditional {
                predicate: self.predicate(predicate),
                when_true: self.blueprints(when_true),
                when_false: self.blueprints(when_false),
            },
            Blueprint::Repeat {
                collection,
                item,
                body,
            } => Blueprint::Repeat {
                collection: self.value(collection),
                item,
                body: self.blueprints(body),
            },
            Blueprint::Include { key, model } => Blueprint::Include {
                key: self.value(key),
                model: self.value(model),
            },
        }
    }
}

impl BlueprintTransformer for ConstantFolder {
    fn name(&self) -> &str {
        "constant-folder"
    }

    fn transform(&self, blueprint: Blueprint, _pass: &TransformPass<'_>) -> Result<Blueprint> {
        Ok(self.fold(blueprint))
    }
}

/// Compiles constant include targets while compiling the includer.
///
/// The blueprint itself is returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeValidator;

impl BlueprintTransformer for IncludeValidator {
    fn name(&self) -> &str {
        "include-validator"
    }

    fn transform(&self, blueprint: Blueprint, pass: &TransformPass<'_>) -> Result<Blueprint> {
        for key in blueprint.constant_include_keys() {
            pass.resolve(&key)?;
        }
        Ok(blueprint)
    }
}

//! Value and predicate resolution.
//!
//! A [`ValueResolver`] turns a [`BlueprintValue`] into a concrete value for a
//! given [`RenderingExecution`]. Three strategies exist, chosen by where the
//! resolution happens:
//!
//! | Strategy | Constant | Format | Path / RequestAttribute |
//! |----------|----------|--------|-------------------------|
//! | [`PathValueResolver`] | value | formatted | live lookup |
//! | [`ConstantValueResolver`] | value | formatted | error |
//! | [`TransformTimeResolver`] | value | formatted | `None` |
//!
//! The materializer uses [`PathValueResolver`]. Transformers run before any
//! data is bound and use [`TransformTimeResolver`]; contexts that must never
//! touch live data use [`ConstantValueResolver`], which fails loudly instead.
//!
//! `None` is the engine's null: a JSON `null` anywhere resolves to `None`.
//!
//! [`PredicateEvaluator`] evaluates [`BlueprintPredicate`]s on top of any
//! value resolver.
//!
//! [`BlueprintPredicate`]: crate::BlueprintPredicate

pub mod coerce;
mod format;
mod predicate;

use std::fmt::Debug;

use serde_json::Value;

use crate::error::{RenderError, Result};
use crate::execution::RenderingExecution;
use crate::ir::BlueprintValue;

pub use format::{format, MAX_FIELD_SIZE};
pub use predicate::PredicateEvaluator;

/// Strategy turning a [`BlueprintValue`] into a runtime value.
pub trait ValueResolver: Debug + Send + Sync {
    /// Resolves `value`; `Ok(None)` is null.
    fn resolve(
        &self,
        value: &BlueprintValue,
        execution: &RenderingExecution,
    ) -> Result<Option<Value>>;
}

/// Live resolver used during materialization.
///
/// Paths whose first segment names a loop variable are resolved against that
/// variable; all other paths are resolved against the root data.
///
/// # Example
///
/// ```rust
/// use blueprint_render::{BlueprintValue, PathValueResolver, RenderingExecution, ValueResolver};
/// use serde_json::json;
///
/// let execution = RenderingExecution::for_data(json!({"user": {"name": "Ada"}}));
/// let name = PathValueResolver
///     .resolve(&BlueprintValue::path("user.name"), &execution)
///     .unwrap();
/// assert_eq!(name, Some(json!("Ada")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PathValueResolver;

impl PathValueResolver {
    fn resolve_path(&self, path: &str, execution: &RenderingExecution) -> Option<Value> {
        let (head, rest) = split_head(path);
        let navigator = execution.navigator();
        match execution.variable(head) {
            Some(accessor) => navigator.navigate(accessor.as_ref(), rest),
            None => navigator.navigate(execution.root(), path),
        }
    }
}

impl ValueResolver for PathValueResolver {
    fn resolve(
        &self,
        value: &BlueprintValue,
        execution: &RenderingExecution,
    ) -> Result<Option<Value>> {
        let resolved = match value {
            BlueprintValue::Constant { value } => Some(value.clone()),
            BlueprintValue::Path { path } => self.resolve_path(path, execution),
            BlueprintValue::RequestAttribute { name } => {
                execution.request().attribute(name).cloned()
            }
            BlueprintValue::Format { pattern, args } => {
                Some(Value::String(format_with(self, pattern, args, execution)?))
            }
        };
        Ok(coerce::non_null(resolved))
    }
}

/// Resolver for contexts that must not read live data.
///
/// Path and request-attribute values fail with
/// [`RenderError::UnsupportedVariant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantValueResolver;

impl ValueResolver for ConstantValueResolver {
    fn resolve(
        &self,
        value: &BlueprintValue,
        execution: &RenderingExecution,
    ) -> Result<Option<Value>> {
        match value {
            BlueprintValue::Constant { value } => Ok(coerce::non_null(Some(value.clone()))),
            BlueprintValue::Format { pattern, args } => Ok(Some(Value::String(format_with(
                self, pattern, args, execution,
            )?))),
            BlueprintValue::Path { .. } | BlueprintValue::RequestAttribute { .. } => {
                Err(RenderError::UnsupportedVariant(format!(
                    "{} value in constant-only resolution",
                    value.kind()
                )))
            }
        }
    }
}

/// Resolver used by transformers, before live data exists.
///
/// Path and request-attribute values resolve to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformTimeResolver;

impl TransformTimeResolver {
    /// Returns the folded value if `value` can be fully resolved without live
    /// data, i.e. it is a constant or a format over constants.
    pub fn fold(&self, value: &BlueprintValue) -> Result<Option<Value>> {
        match value {
            BlueprintValue::Constant { value } => Ok(Some(value.clone())),
            BlueprintValue::Format { pattern, args } => {
                let mut resolved = Vec::with_capacity(args.len());
                for arg in args {
                    match self.fold(arg)? {
                        Some(v) => resolved.push(coerce::non_null(Some(v))),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::String(format(pattern, &resolved)?)))
            }
            BlueprintValue::Path { .. } | BlueprintValue::RequestAttribute { .. } => Ok(None),
        }
    }
}

impl ValueResolver for TransformTimeResolver {
    fn resolve(
        &self,
        value: &BlueprintValue,
        execution: &RenderingExecution,
    ) -> Result<Option<Value>> {
        match value {
            BlueprintValue::Constant { value } => Ok(coerce::non_null(Some(value.clone()))),
            BlueprintValue::Format { pattern, args } => Ok(Some(Value::String(format_with(
                self, pattern, args, execution,
            )?))),
            BlueprintValue::Path { .. } | BlueprintValue::RequestAttribute { .. } => Ok(None),
        }
    }
}

fn format_with<R: ValueResolver + ?Sized>(
    resolver: &R,
    pattern: &str,
    args: &[BlueprintValue],
    execution: &RenderingExecution,
) -> Result<String> {
    let resolved = args
        .iter()
        .map(|arg| resolver.resolve(arg, execution))
        .collect::<Result<Vec<_>>>()?;
    format(pattern, &resolved)
}

/// Splits `user.name` into (`user`, `name`) and `rows[0].id` into
/// (`rows`, `[0].id`).
fn split_head(path: &str) -> (&str, &str) {
    match path.find(['.', '[']) {
        Some(pos) => {
            let rest = &path[pos..];
            (&path[..pos], rest.strip_prefix('.').unwrap_or(rest))
        }
        None => (path, ""),
    }
}

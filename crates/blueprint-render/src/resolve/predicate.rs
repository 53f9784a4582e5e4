//! Predicate evaluation.

use std::sync::Arc;

use super::coerce;
use super::{PathValueResolver, ValueResolver};
use crate::error::Result;
use crate::execution::RenderingExecution;
use crate::ir::{BlueprintPredicate, BlueprintValue};

/// Evaluates [`BlueprintPredicate`]s using a [`ValueResolver`].
///
/// `All` and `Any` stop at the first deciding operand, so later operands are
/// never resolved (and cannot fail) once the result is known.
///
/// # Example
///
/// ```rust
/// use blueprint_render::{BlueprintPredicate, BlueprintValue, PredicateEvaluator, RenderingExecution};
/// use serde_json::json;
///
/// let execution = RenderingExecution::for_data(json!({"roles": ["admin"]}));
/// let is_admin = BlueprintPredicate::contains(
///     BlueprintValue::path("roles"),
///     BlueprintValue::constant("admin"),
/// );
/// assert!(PredicateEvaluator::live().evaluate(&is_admin, &execution).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct PredicateEvaluator {
    values: Arc<dyn ValueResolver>,
}

impl PredicateEvaluator {
    pub fn new(values: Arc<dyn ValueResolver>) -> Self {
        Self { values }
    }

    /// An evaluator over live data ([`PathValueResolver`]).
    pub fn live() -> Self {
        Self::new(Arc::new(PathValueResolver))
    }

    /// The value resolver operands are resolved with.
    pub fn values(&self) -> &dyn ValueResolver {
        self.values.as_ref()
    }

    pub fn evaluate(
        &self,
        predicate: &BlueprintPredicate,
        execution: &RenderingExecution,
    ) -> Result<bool> {
        let resolve = |value: &BlueprintValue| self.values.resolve(value, execution);
        Ok(match predicate {
            BlueprintPredicate::BooleanValue { value } => coerce::to_bool(resolve(value)?.as_ref()),
            BlueprintPredicate::Present { value } => coerce::is_present(resolve(value)?.as_ref()),
            BlueprintPredicate::Equality { left, right } => resolve(left)? == resolve(right)?,
            BlueprintPredicate::Not { inner } => !self.evaluate(inner, execution)?,
            BlueprintPredicate::All { predicates } => {
                for p in predicates {
                    if !self.evaluate(p, execution)? {
                        return Ok(false);
                    }
                }
                true
            }
            BlueprintPredicate::Any { predicates } => {
                for p in predicates {
                    if self.evaluate(p, execution)? {
                        return Ok(true);
                    }
                }
                false
            }
            BlueprintPredicate::Contains { collection, value } => {
                coerce::contains(resolve(collection)?.as_ref(), resolve(value)?.as_ref())
            }
        })
    }
}

impl Default for PredicateEvaluator {
    fn default() -> Self {
        Self::live()
    }
}

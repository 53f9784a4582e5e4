//! Boolean expressions over values.

use serde::{Deserialize, Serialize};

use super::value::BlueprintValue;

/// A boolean expression evaluated by the
/// [`PredicateEvaluator`](crate::PredicateEvaluator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlueprintPredicate {
    /// The value coerced to a boolean.
    BooleanValue {
        /// Value to coerce
        value: BlueprintValue,
    },
    /// The value is non-null and, for strings and collections, non-empty.
    Present {
        /// Value to test
        value: BlueprintValue,
    },
    /// Both values resolve to equal values.
    Equality {
        /// Left operand
        left: BlueprintValue,
        /// Right operand
        right: BlueprintValue,
    },
    /// Negation.
    Not {
        /// Negated predicate
        inner: Box<BlueprintPredicate>,
    },
    /// Logical AND; true for an empty list.
    All {
        /// Operands
        predicates: Vec<BlueprintPredicate>,
    },
    /// Logical OR; false for an empty list.
    Any {
        /// Operands
        predicates: Vec<BlueprintPredicate>,
    },
    /// The collection contains the value.
    Contains {
        /// Array, object or string to search
        collection: BlueprintValue,
        /// Value to look for
        value: BlueprintValue,
    },
}

impl BlueprintPredicate {
    pub fn boolean(value: BlueprintValue) -> Self {
        BlueprintPredicate::BooleanValue { value }
    }

    pub fn present(value: BlueprintValue) -> Self {
        BlueprintPredicate::Present { value }
    }

    pub fn equals(left: BlueprintValue, right: BlueprintValue) -> Self {
        BlueprintPredicate::Equality { left, right }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: BlueprintPredicate) -> Self {
        BlueprintPredicate::Not {
            inner: Box::new(inner),
        }
    }

    pub fn all(predicates: Vec<BlueprintPredicate>) -> Self {
        BlueprintPredicate::All { predicates }
    }

    pub fn any(predicates: Vec<BlueprintPredicate>) -> Self {
        BlueprintPredicate::Any { predicates }
    }

    pub fn contains(collection: BlueprintValue, value: BlueprintValue) -> Self {
        BlueprintPredicate::Contains { collection, value }
    }

    /// A predicate that is always true.
    pub fn always() -> Self {
        BlueprintPredicate::boolean(BlueprintValue::constant(true))
    }

    /// A predicate that is always false.
    pub fn never() -> Self {
        BlueprintPredicate::boolean(BlueprintValue::constant(false))
    }
}

//! Value expressions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes how to obtain a runtime value.
///
/// Values are immutable once constructed. How each variant is resolved is
/// decided by the active [`ValueResolver`](crate::ValueResolver) strategy.
///
/// # Example
///
/// ```rust
/// use blueprint_render::BlueprintValue;
///
/// let label = BlueprintValue::format(
///     "%s (%s)",
///     vec![BlueprintValue::path("user.name"), BlueprintValue::path("user.role")],
/// );
/// assert!(!label.is_constant());
/// assert!(BlueprintValue::constant("x").is_constant());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlueprintValue {
    /// A literal value.
    Constant {
        /// The stored value
        value: Value,
    },
    /// A dotted/indexed path into the root data or a loop variable.
    Path {
        /// Path expression, e.g. `user.name` or `items[0].title`
        path: String,
    },
    /// A request attribute, looked up by exact name.
    RequestAttribute {
        /// Attribute name
        name: String,
    },
    /// A printf-style pattern filled with resolved arguments.
    Format {
        /// The pattern, e.g. `%s-%s`
        pattern: String,
        /// Positional arguments
        #[serde(default)]
        args: Vec<BlueprintValue>,
    },
}

impl BlueprintValue {
    /// Creates a constant value.
    pub fn constant(value: impl Into<Value>) -> Self {
        BlueprintValue::Constant {
            value: value.into(),
        }
    }

    /// Creates a constant `null`.
    pub fn null() -> Self {
        BlueprintValue::Constant { value: Value::Null }
    }

    /// Creates a path value.
    pub fn path(path: impl Into<String>) -> Self {
        BlueprintValue::Path { path: path.into() }
    }

    /// Creates a request attribute value.
    pub fn request_attribute(name: impl Into<String>) -> Self {
        BlueprintValue::RequestAttribute { name: name.into() }
    }

    /// Creates a format value.
    pub fn format(pattern: impl Into<String>, args: Vec<BlueprintValue>) -> Self {
        BlueprintValue::Format {
            pattern: pattern.into(),
            args,
        }
    }

    /// Returns true for [`BlueprintValue::Constant`].
    pub fn is_constant(&self) -> bool {
        matches!(self, BlueprintValue::Constant { .. })
    }

    /// Short variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            BlueprintValue::Constant { .. } => "constant",
            BlueprintValue::Path { .. } => "path",
            BlueprintValue::RequestAttribute { .. } => "request_attribute",
            BlueprintValue::Format { .. } => "format",
        }
    }
}

impl From<&str> for BlueprintValue {
    fn from(s: &str) -> Self {
        BlueprintValue::constant(s)
    }
}

impl From<String> for BlueprintValue {
    fn from(s: String) -> Self {
        BlueprintValue::constant(s)
    }
}

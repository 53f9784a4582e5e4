//! Error types for blueprint resolution and rendering.
//!
//! This module provides [`RenderError`], the single error type returned by
//! every fallible operation in the crate: catalog lookups, value resolution,
//! transformers, the resolver, the materializer, and pipeline hooks.
//!
//! One variant is not a failure: [`RenderError::ShortCircuit`] is a control
//! signal carrying a finished [`Node`]. It travels through the same `?`
//! plumbing as real errors and is converted back into a successful result by
//! [`RenderingPipeline::render`](crate::RenderingPipeline::render).

use blueprint_dom::Node;
use thiserror::Error;

use crate::hooks::RenderStage;

/// Error type for blueprint rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No blueprint is registered under the key.
    #[error("blueprint not found: \"{key}\"")]
    NotFound {
        /// The key that was requested
        key: String,
    },

    /// A key was re-entered while it was still being resolved or rendered.
    #[error("circular blueprint reference: {}", format_chain(.chain, .key))]
    CircularReference {
        /// The key that closed the cycle
        key: String,
        /// Keys that were in progress when the cycle was detected, outermost first
        chain: Vec<String>,
    },

    /// A value or predicate variant the active strategy cannot handle.
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(String),

    /// An include chain grew past the configured limit.
    #[error("include depth {depth} exceeds limit of {limit} while including \"{key}\"")]
    IncludeDepthExceeded {
        /// The key whose inclusion crossed the limit
        key: String,
        /// Depth the include would have reached
        depth: usize,
        /// Configured maximum depth
        limit: usize,
    },

    /// Invalid format pattern or missing format argument.
    #[error("format error: {0}")]
    Format(String),

    /// A transformer rejected or failed to rewrite a blueprint.
    #[error("transform error: {message}")]
    Transform {
        /// Human-readable error message
        message: String,
    },

    /// A lifecycle hook failed.
    #[error("hook error ({stage}): {message}")]
    Hook {
        /// The stage at which the hook ran
        stage: RenderStage,
        /// Human-readable error message
        message: String,
    },

    /// Host data could not be converted into a value tree.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Abort normal flow and return the carried node as the render result.
    #[error("rendering short-circuited")]
    ShortCircuit(ShortCircuit),
}

impl RenderError {
    /// Creates a short-circuit signal carrying the substitute result.
    pub fn short_circuit(node: impl Into<Node>) -> Self {
        RenderError::ShortCircuit(ShortCircuit::new(node))
    }

    /// Creates a hook error for the given stage.
    pub fn hook(stage: RenderStage, message: impl Into<String>) -> Self {
        RenderError::Hook {
            stage,
            message: message.into(),
        }
    }

    /// Creates a transform error.
    pub fn transform(message: impl Into<String>) -> Self {
        RenderError::Transform {
            message: message.into(),
        }
    }

    /// Returns true if this is a short-circuit signal rather than a failure.
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, RenderError::ShortCircuit(_))
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

/// Control signal that replaces the render result with a pre-built node.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortCircuit {
    node: Box<Node>,
}

impl ShortCircuit {
    /// Creates a short-circuit carrying `node`.
    pub fn new(node: impl Into<Node>) -> Self {
        Self {
            node: Box::new(node.into()),
        }
    }

    /// The node that becomes the render result.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Consumes the signal, returning the node.
    pub fn into_node(self) -> Node {
        *self.node
    }
}

fn format_chain(chain: &[String], key: &str) -> String {
    let mut parts: Vec<&str> = chain.iter().map(|s| s.as_str()).collect();
    parts.push(key);
    parts.join(" -> ")
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RenderError::NotFound { key: "foo".into() };
        assert_eq!(err.to_string(), "blueprint not found: \"foo\"");
    }

    #[test]
    fn test_circular_display_includes_chain() {
        let err = RenderError::CircularReference {
            key: "a".into(),
            chain: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "circular blueprint reference: a -> b -> a");
    }

    #[test]
    fn test_hook_display() {
        let err = RenderError::hook(RenderStage::BeforeResolve, "denied");
        assert_eq!(err.to_string(), "hook error (before-resolve): denied");
    }

    #[test]
    fn test_short_circuit_carries_node() {
        let err = RenderError::short_circuit(Node::text("placeholder"));
        assert!(err.is_short_circuit());
        match err {
            RenderError::ShortCircuit(signal) => {
                assert_eq!(signal.node(), &Node::text("placeholder"));
                assert_eq!(signal.into_node(), Node::text("placeholder"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RenderError = json_err.into();
        assert!(matches!(err, RenderError::Serialization(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RenderError = io_err.into();
        assert!(matches!(err, RenderError::Config(_)));
    }
}

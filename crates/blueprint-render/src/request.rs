//! Request attributes.

use indexmap::IndexMap;
use serde_json::Value;

/// An ordered bag of request attributes.
///
/// Built before rendering starts (see
/// [`RenderingPipeline::render_with`](crate::RenderingPipeline::render_with))
/// and read-only afterwards. Blueprints read it through
/// [`BlueprintValue::RequestAttribute`](crate::BlueprintValue::RequestAttribute);
/// nested include executions share the same request.
///
/// # Example
///
/// ```rust
/// use blueprint_render::RenderingRequest;
///
/// let request = RenderingRequest::new()
///     .with_attribute("locale", "en-GB")
///     .with_attribute("page", 2);
///
/// assert_eq!(request.attribute("page"), Some(&serde_json::json!(2)));
/// assert_eq!(request.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderingRequest {
    attributes: IndexMap<String, Value>,
}

impl RenderingRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, returning the request.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Adds or replaces an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Looks up an attribute by exact name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Iterates attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

//! # Blueprint DOM - Output Node Tree
//!
//! A deliberately small node model: elements with ordered string attributes
//! and ordered children, and text nodes. The Blueprint materializer only ever
//! needs four operations from it:
//!
//! - create an element node for a tag ([`Element::new`])
//! - create a text node ([`Node::text`])
//! - append a child ([`Element::append_child`])
//! - set a string attribute ([`Element::set_attribute`])
//!
//! Everything else here exists for consumers of the rendered tree: markup
//! serialization, text extraction, and `serde` support for dumping trees as
//! JSON or YAML.
//!
//! ## Example
//!
//! ```rust
//! use blueprint_dom::{Element, Node};
//!
//! let mut link = Element::new("a");
//! link.set_attribute("href", "/users/1");
//! link.append_child(Node::text("Ada & co"));
//!
//! let node = Node::from(link);
//! assert_eq!(node.to_markup(), r#"<a href="/users/1">Ada &amp; co</a>"#);
//! assert_eq!(node.text_content(), "Ada & co");
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node in the rendered output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A tagged element with attributes and children.
    Element(Element),
    /// A text node. May be empty.
    Text(String),
}

impl Node {
    /// Creates a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Creates an empty text node.
    ///
    /// This is the placeholder the materializer emits for degraded output
    /// (empty branches, non-collection loops, missing include keys).
    pub fn empty() -> Self {
        Node::Text(String::new())
    }

    /// Returns true if this node is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Returns true if this is a text node with no content.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Node::Text(s) if s.is_empty())
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Returns the text content if this node is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            Node::Element(_) => None,
        }
    }

    /// Concatenates all descendant text in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Element(e) => {
                for child in &e.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serializes the tree as markup.
    ///
    /// Text and attribute values are escaped. Empty elements are written with
    /// an explicit closing tag (`<br></br>`); there is no void-element table.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Node::Text(s) => escape_into(out, s, false),
            Node::Element(e) => {
                out.push('<');
                out.push_str(&e.tag);
                for (name, value) in &e.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(out, value, true);
                    out.push('"');
                }
                out.push('>');
                for child in &e.children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(&e.tag);
                out.push('>');
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// An element node: tag name, ordered attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// The tag name.
    pub tag: String,
    /// Attributes in insertion order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Sets an attribute, replacing any previous value but keeping its position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Appends a child node.
    pub fn append_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder-style [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style [`append_child`](Self::append_child).
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.append_child(child.into());
        self
    }
}

fn escape_into(out: &mut String, s: &str, attribute: bool) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

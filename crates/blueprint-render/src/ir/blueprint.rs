//! The blueprint tree and element directives.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::predicate::BlueprintPredicate;
use super::value::BlueprintValue;

/// One markup construct.
///
/// Trees are acyclic. A cycle can only be formed through an
/// [`Include`](Blueprint::Include) whose key leads back to an enclosing
/// blueprint, which the resolver and materializer detect at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blueprint {
    /// A markup element.
    Element {
        /// Tag name
        tag: String,
        /// Attribute name to value, in declaration order
        #[serde(default)]
        attributes: IndexMap<String, BlueprintValue>,
        /// Child blueprints
        #[serde(default)]
        children: Vec<Blueprint>,
        /// Conditional decorations attached to this element
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        directives: Vec<BlueprintDirective>,
    },
    /// A text node.
    Text {
        /// Text content
        value: BlueprintValue,
    },
    /// Branch selection.
    Conditional {
        /// The condition
        predicate: BlueprintPredicate,
        /// Rendered when the predicate holds
        #[serde(default)]
        when_true: Vec<Blueprint>,
        /// Rendered otherwise
        #[serde(default)]
        when_false: Vec<Blueprint>,
    },
    /// Iteration over a list or map.
    Repeat {
        /// The collection to iterate
        collection: BlueprintValue,
        /// Name the current item is bound to inside `body`
        item: String,
        /// Rendered once per item
        #[serde(default)]
        body: Vec<Blueprint>,
    },
    /// Delegation to another named blueprint with a new root object.
    Include {
        /// Catalog key of the included blueprint
        key: BlueprintValue,
        /// Root data for the included blueprint
        model: BlueprintValue,
    },
}

impl Blueprint {
    /// Starts building an element.
    pub fn element(tag: impl Into<String>) -> ElementBuilder {
        ElementBuilder::new(tag)
    }

    /// Creates a text blueprint.
    pub fn text(value: impl Into<BlueprintValue>) -> Self {
        Blueprint::Text {
            value: value.into(),
        }
    }

    /// Creates a conditional blueprint.
    pub fn conditional(
        predicate: BlueprintPredicate,
        when_true: Vec<Blueprint>,
        when_false: Vec<Blueprint>,
    ) -> Self {
        Blueprint::Conditional {
            predicate,
            when_true,
            when_false,
        }
    }

    /// Creates a repeat blueprint.
    pub fn repeat(collection: BlueprintValue, item: impl Into<String>, body: Vec<Blueprint>) -> Self {
        Blueprint::Repeat {
            collection,
            item: item.into(),
            body,
        }
    }

    /// Creates an include blueprint.
    pub fn include(key: impl Into<BlueprintValue>, model: BlueprintValue) -> Self {
        Blueprint::Include {
            key: key.into(),
            model,
        }
    }

    /// Short variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Blueprint::Element { .. } => "element",
            Blueprint::Text { .. } => "text",
            Blueprint::Conditional { .. } => "conditional",
            Blueprint::Repeat { .. } => "repeat",
            Blueprint::Include { .. } => "include",
        }
    }

    /// Include keys that are constants, in document order.
    ///
    /// Dynamic keys are skipped; they can only be known at render time.
    pub fn constant_include_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.collect_include_keys(&mut keys);
        keys
    }

    fn collect_include_keys(&self, out: &mut Vec<String>) {
        match self {
            Blueprint::Element { children, .. } => {
                children.iter().for_each(|c| c.collect_include_keys(out))
            }
            Blueprint::Text { .. } => {}
            Blueprint::Conditional {
                when_true,
                when_false,
                ..
            } => when_true
                .iter()
                .chain(when_false)
                .for_each(|c| c.collect_include_keys(out)),
            Blueprint::Repeat { body, .. } => body.iter().for_each(|c| c.collect_include_keys(out)),
            Blueprint::Include { key, .. } => {
                if let BlueprintValue::Constant {
                    value: serde_json::Value::String(s),
                } = key
                {
                    out.push(s.clone());
                }
            }
        }
    }
}

/// A conditional decoration declared on an element.
///
/// Directives are carried in the tree and serialized with it, but no built-in
/// stage applies them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlueprintDirective {
    SetAttributeIf {
        predicate: BlueprintPredicate,
        name: String,
        value: BlueprintValue,
    },
    RemoveAttributeIf {
        predicate: BlueprintPredicate,
        name: String,
    },
    AddClassIf {
        predicate: BlueprintPredicate,
        class: String,
    },
    WrapIf {
        predicate: BlueprintPredicate,
        tag: String,
        #[serde(default)]
        attributes: IndexMap<String, BlueprintValue>,
    },
    OmitIf {
        predicate: BlueprintPredicate,
    },
}

impl BlueprintDirective {
    /// The predicate guarding this directive.
    pub fn predicate(&self) -> &BlueprintPredicate {
        match self {
            BlueprintDirective::SetAttributeIf { predicate, .. }
            | BlueprintDirective::RemoveAttributeIf { predicate, .. }
            | BlueprintDirective::AddClassIf { predicate, .. }
            | BlueprintDirective::WrapIf { predicate, .. }
            | BlueprintDirective::OmitIf { predicate } => predicate,
        }
    }
}

/// Builder for [`Blueprint::Element`].
///
/// # Example
///
/// ```rust
/// use blueprint_render::{Blueprint, BlueprintValue};
///
/// let card = Blueprint::element("div")
///     .attribute("class", "card")
///     .attribute("data-id", BlueprintValue::path("id"))
///     .child(Blueprint::text(BlueprintValue::path("title")))
///     .build();
/// assert_eq!(card.kind(), "element");
/// ```
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    attributes: IndexMap<String, BlueprintValue>,
    children: Vec<Blueprint>,
    directives: Vec<BlueprintDirective>,
}

impl ElementBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            directives: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<BlueprintValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<Blueprint>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Blueprint>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn directive(mut self, directive: BlueprintDirective) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn build(self) -> Blueprint {
        Blueprint::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
            directives: self.directives,
        }
    }
}

impl From<ElementBuilder> for Blueprint {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}

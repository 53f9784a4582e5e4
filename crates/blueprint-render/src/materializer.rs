//! Blueprint interpretation.
//!
//! The materializer walks a compiled [`Blueprint`] and builds a [`Node`] tree,
//! one variant at a time:
//!
//! | Variant | Output |
//! |---------|--------|
//! | `Element` | element with resolved attributes (null attributes omitted) and materialized children |
//! | `Text` | text node with the resolved value's string form, `""` for null |
//! | `Conditional` | empty text, the single child, or a container around several children |
//! | `Repeat` | container holding every iteration's output; empty text for non-collections |
//! | `Include` | the included blueprint, materialized against its model; empty text for a null key |
//!
//! "Container" is a structural wrapper element whose tag comes from
//! [`PipelineConfig::container_tag`].
//!
//! The walk keeps no state between calls. Loop bindings live in child
//! executions that are dropped as soon as their iteration is done.

use std::sync::Arc;

use blueprint_dom::{Element, Node};
use serde_json::Value;
use tracing::trace;

use crate::config::PipelineConfig;
use crate::error::{RenderError, Result};
use crate::execution::RenderingExecution;
use crate::ir::{Blueprint, BlueprintPredicate, BlueprintValue};
use crate::resolve::{coerce, PathValueResolver, PredicateEvaluator, ValueResolver};
use crate::resolver::BlueprintResolver;

/// Turns compiled blueprints into node trees.
#[derive(Debug, Clone)]
pub struct BlueprintMaterializer {
    resolver: Arc<BlueprintResolver>,
    values: Arc<dyn ValueResolver>,
    predicates: PredicateEvaluator,
    config: PipelineConfig,
}

impl BlueprintMaterializer {
    /// Creates a materializer over live data with the default config.
    pub fn new(resolver: Arc<BlueprintResolver>) -> Self {
        let values: Arc<dyn ValueResolver> = Arc::new(PathValueResolver);
        Self {
            resolver,
            predicates: PredicateEvaluator::new(values.clone()),
            values,
            config: PipelineConfig::default(),
        }
    }

    /// Replaces the config after [`PipelineConfig::validate`] accepts it.
    pub fn with_config(self, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(self.with_validated_config(config))
    }

    pub(crate) fn with_validated_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the value resolver used for values and predicate operands.
    pub fn with_value_resolver(mut self, values: Arc<dyn ValueResolver>) -> Self {
        self.predicates = PredicateEvaluator::new(values.clone());
        self.values = values;
        self
    }

    pub fn resolver(&self) -> &Arc<BlueprintResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Materializes `blueprint` against `execution`.
    pub fn materialize(&self, blueprint: &Blueprint, execution: &RenderingExecution) -> Result<Node> {
        match blueprint {
            Blueprint::Element {
                tag,
                attributes,
                children,
                ..
            } => {
                let mut element = Element::new(tag.as_str());
                for (name, value) in attributes {
                    if let Some(resolved) = self.resolve(value, execution)? {
                        element.set_attribute(name.as_str(), coerce::to_text(Some(&resolved)));
                    }
                }
                for child in children {
                    element.append_child(self.materialize(child, execution)?);
                }
                Ok(element.into())
            }
            Blueprint::Text { value } => {
                let resolved = self.resolve(value, execution)?;
                Ok(Node::text(coerce::to_text(resolved.as_ref())))
            }
            Blueprint::Conditional {
                predicate,
                when_true,
                when_false,
            } => self.conditional(predicate, when_true, when_false, execution),
            Blueprint::Repeat {
                collection,
                item,
                body,
            } => self.repeat(collection, item, body, execution),
            Blueprint::Include { key, model } => self.include(key, model, execution),
        }
    }

    fn resolve(&self, value: &BlueprintValue, execution: &RenderingExecution) -> Result<Option<Value>> {
        self.values.resolve(value, execution)
    }

    fn container(&self) -> Element {
        Element::new(self.config.container_tag.as_str())
    }

    fn conditional(
        &self,
        predicate: &BlueprintPredicate,
        when_true: &[Blueprint],
        when_false: &[Blueprint],
        execution: &RenderingExecution,
    ) -> Result<Node> {
        let branch = if self.predicates.evaluate(predicate, execution)? {
            when_true
        } else {
            when_false
        };
        match branch {
            [] => Ok(Node::empty()),
            [only] => self.materialize(only, execution),
            many => {
                let mut container = self.container();
                for child in many {
                    container.append_child(self.materialize(child, execution)?);
                }
                Ok(container.into())
            }
        }
    }

    fn repeat(
        &self,
        collection: &BlueprintValue,
        item: &str,
        body: &[Blueprint],
        execution: &RenderingExecution,
    ) -> Result<Node> {
        let resolved = self.resolve(collection, execution)?.unwrap_or(Value::Null);
        let collection = execution.wrap(resolved);
        if !collection.is_collection() {
            return Ok(Node::empty());
        }

        let mut container = self.container();
        for key in collection.keys() {
            let value = collection.get(&key).unwrap_or(Value::Null);
            let iteration = execution.with_variable(item, execution.wrap(value));
            for child in body {
                container.append_child(self.materialize(child, &iteration)?);
            }
        }
        Ok(container.into())
    }

    fn include(
        &self,
        key: &BlueprintValue,
        model: &BlueprintValue,
        execution: &RenderingExecution,
    ) -> Result<Node> {
        let key = match self.resolve(key, execution)? {
            Some(key) => coerce::to_text(Some(&key)),
            None => return Ok(Node::empty()),
        };

        let trail = execution.include_trail();
        if trail.iter().any(|k| *k == key) {
            return Err(RenderError::CircularReference {
                key,
                chain: trail.to_vec(),
            });
        }
        let depth = trail.len() + 1;
        let limit = self.config.max_include_depth;
        if depth > limit {
            return Err(RenderError::IncludeDepthExceeded { key, depth, limit });
        }
        trace!(key = key.as_str(), depth, "including blueprint");

        let model = self.resolve(model, execution)?.unwrap_or(Value::Null);
        let nested = execution.nested(&key, execution.wrap(model));
        let compiled = self.resolver.resolve(&key, &nested)?;
        self.materialize(&compiled, &nested)
    }
}

//! The top-level render entry point.
//!
//! [`RenderingPipeline`] ties the pieces together for one render:
//!
//! ```text
//! render(key, data)
//!   → build request (customizer) and execution
//!   → before-resolve hooks
//!   → BlueprintResolver::resolve        (catalog → transformers → cache)
//!   → after-resolve hooks
//!   → before-materialize hooks
//!   → BlueprintMaterializer::materialize
//!   → after-materialize hooks
//!   → node
//! ```
//!
//! A [`RenderError::ShortCircuit`] raised at any step ends the render
//! successfully with the carried node. Any other error runs the failure hooks
//! and is then returned unchanged.
//!
//! One pipeline serves any number of concurrent renders; everything a render
//! mutates lives in its own [`RenderingExecution`].

use std::sync::Arc;

use blueprint_dom::Node;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::accessor::{AccessorWrapper, DotPathNavigator, JsonAccessorWrapper, ValueNavigator};
use crate::catalog::{BlueprintCatalog, InMemoryCatalog};
use crate::config::PipelineConfig;
use crate::error::{RenderError, Result};
use crate::execution::RenderingExecution;
use crate::hooks::{Hooks, RenderStage};
use crate::ir::Blueprint;
use crate::materializer::BlueprintMaterializer;
use crate::request::RenderingRequest;
use crate::resolve::ValueResolver;
use crate::resolver::BlueprintResolver;
use crate::transform::{BlueprintTransformer, TransformPass, TransformerChain};

/// Renders catalog blueprints against data.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use blueprint_render::{Blueprint, BlueprintValue, InMemoryCatalog, RenderingPipeline};
/// use serde_json::json;
///
/// let catalog = InMemoryCatalog::new().with(
///     "greeting",
///     Blueprint::element("p")
///         .child(Blueprint::text(BlueprintValue::path("user.name")))
///         .build(),
/// );
/// let pipeline = RenderingPipeline::builder()
///     .catalog(Arc::new(catalog))
///     .build();
///
/// let node = pipeline.render("greeting", &json!({"user": {"name": "Ada"}})).unwrap();
/// assert_eq!(node.to_markup(), "<p>Ada</p>");
/// ```
#[derive(Debug, Clone)]
pub struct RenderingPipeline {
    resolver: Arc<BlueprintResolver>,
    materializer: BlueprintMaterializer,
    hooks: Hooks,
    wrapper: Arc<dyn AccessorWrapper>,
    navigator: Arc<dyn ValueNavigator>,
    config: PipelineConfig,
}

impl RenderingPipeline {
    pub fn builder() -> RenderingPipelineBuilder {
        RenderingPipelineBuilder::new()
    }

    /// Renders the blueprint registered under `key` with an empty request.
    pub fn render<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<Node> {
        self.render_with(key, data, |request| request)
    }

    /// Renders with a request built by `customize`.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use blueprint_render::{Blueprint, BlueprintValue, InMemoryCatalog, RenderingPipeline};
    /// # use serde_json::json;
    /// let catalog = InMemoryCatalog::new()
    ///     .with("lang", Blueprint::text(BlueprintValue::request_attribute("locale")));
    /// let pipeline = RenderingPipeline::builder().catalog(Arc::new(catalog)).build();
    ///
    /// let node = pipeline
    ///     .render_with("lang", &json!({}), |r| r.with_attribute("locale", "fr-CA"))
    ///     .unwrap();
    /// assert_eq!(node.text_content(), "fr-CA");
    /// ```
    pub fn render_with<T, F>(&self, key: &str, data: &T, customize: F) -> Result<Node>
    where
        T: Serialize + ?Sized,
        F: FnOnce(RenderingRequest) -> RenderingRequest,
    {
        let request = Arc::new(customize(RenderingRequest::new()));
        let data = serde_json::to_value(data)?;

        let mut execution = RenderingExecution::new(
            self.wrapper.clone(),
            self.navigator.clone(),
            self.wrapper.wrap(data.clone()),
            request,
        );
        execution.enter_include_trail(key);

        match self.run(key, &data, &execution) {
            Ok(node) => Ok(node),
            Err((stage, RenderError::ShortCircuit(signal))) => {
                debug!(key, %stage, "render short-circuited");
                Ok(signal.into_node())
            }
            Err((stage, error)) => {
                debug!(key, %stage, %error, "render failed");
                self.hooks.run_on_failure(&error, stage, &execution);
                Err(error)
            }
        }
    }

    fn run(
        &self,
        key: &str,
        data: &Value,
        execution: &RenderingExecution,
    ) -> std::result::Result<Node, (RenderStage, RenderError)> {
        let at = |stage: RenderStage| move |error: RenderError| (stage, error);

        self.hooks
            .run_before_resolve(key, data, execution.request(), execution)
            .map_err(at(RenderStage::BeforeResolve))?;

        let blueprint = self
            .resolver
            .resolve(key, execution)
            .map_err(at(RenderStage::Resolve))?;

        self.hooks
            .run_after_resolve(key, &blueprint, execution)
            .map_err(at(RenderStage::AfterResolve))?;
        self.hooks
            .run_before_materialize(&blueprint, execution)
            .map_err(at(RenderStage::BeforeMaterialize))?;

        let node = self
            .materializer
            .materialize(&blueprint, execution)
            .map_err(at(RenderStage::Materialize))?;

        self.hooks
            .run_after_materialize(&node, execution)
            .map_err(at(RenderStage::AfterMaterialize))?;

        Ok(node)
    }

    /// Compiles `key` ahead of the first render.
    ///
    /// Errors are returned directly; hooks do not run.
    pub fn precompile(&self, key: &str) -> Result<Arc<Blueprint>> {
        let execution = RenderingExecution::new(
            self.wrapper.clone(),
            self.navigator.clone(),
            self.wrapper.wrap(Value::Null),
            Arc::new(RenderingRequest::new()),
        );
        self.resolver.resolve(key, &execution)
    }

    pub fn resolver(&self) -> &Arc<BlueprintResolver> {
        &self.resolver
    }

    pub fn materializer(&self) -> &BlueprintMaterializer {
        &self.materializer
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// Builder for [`RenderingPipeline`].
#[derive(Debug, Default)]
pub struct RenderingPipelineBuilder {
    catalog: Option<Arc<dyn BlueprintCatalog>>,
    transformers: TransformerChain,
    hooks: Hooks,
    wrapper: Option<Arc<dyn AccessorWrapper>>,
    navigator: Option<Arc<dyn ValueNavigator>>,
    values: Option<Arc<dyn ValueResolver>>,
    config: PipelineConfig,
}

impl RenderingPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the catalog. Defaults to an empty [`InMemoryCatalog`].
    pub fn catalog(mut self, catalog: Arc<dyn BlueprintCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Adds a transformer at `priority`.
    pub fn transformer<T: BlueprintTransformer + 'static>(mut self, priority: i32, transformer: T) -> Self {
        self.transformers = self.transformers.add(priority, transformer);
        self
    }

    /// Adds a closure transformer at `priority`.
    pub fn transformer_fn<F>(mut self, priority: i32, f: F) -> Self
    where
        F: Fn(Blueprint, &TransformPass<'_>) -> Result<Blueprint> + Send + Sync + 'static,
    {
        self.transformers = self.transformers.add_fn(priority, f);
        self
    }

    /// Replaces the whole transformer chain.
    pub fn transformers(mut self, chain: TransformerChain) -> Self {
        self.transformers = chain;
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the accessor wrapper. Defaults to [`JsonAccessorWrapper`].
    pub fn accessor_wrapper(mut self, wrapper: Arc<dyn AccessorWrapper>) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// Sets the path navigator. Defaults to [`DotPathNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn ValueNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Sets the value resolver used while materializing.
    pub fn value_resolver(mut self, values: Arc<dyn ValueResolver>) -> Self {
        self.values = Some(values);
        self
    }

    /// Sets the config, rejecting values [`PipelineConfig::validate`] refuses.
    pub fn config(mut self, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn build(self) -> RenderingPipeline {
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(InMemoryCatalog::new()));
        let resolver =
            Arc::new(BlueprintResolver::new(catalog).with_transformers(self.transformers));

        let mut materializer =
            BlueprintMaterializer::new(resolver.clone()).with_validated_config(self.config.clone());
        if let Some(values) = self.values {
            materializer = materializer.with_value_resolver(values);
        }

        RenderingPipeline {
            resolver,
            materializer,
            hooks: self.hooks,
            wrapper: self.wrapper.unwrap_or_else(|| Arc::new(JsonAccessorWrapper)),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(DotPathNavigator)),
            config: self.config,
        }
    }
}

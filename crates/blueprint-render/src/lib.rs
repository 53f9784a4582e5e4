//! # Blueprint Render - Template IR Rendering Engine
//!
//! `blueprint-render` interprets blueprints (a small, closed template IR) against
//! data and produces [`Node`] trees. Blueprints are built in code or deserialized
//! with `serde`; there is no authoring syntax.
//!
//! ## Core Concepts
//!
//! - [`Blueprint`]: the IR tree (`Element`, `Text`, `Conditional`, `Repeat`, `Include`)
//! - [`BlueprintValue`] / [`BlueprintPredicate`]: values and conditions inside it
//! - [`BlueprintCatalog`]: named blueprints ([`InMemoryCatalog`], [`OverlayCatalog`])
//! - [`TransformerChain`]: priority-ordered rewrites applied once per key
//! - [`BlueprintResolver`]: key to compiled blueprint, cached, with cycle detection
//! - [`BlueprintMaterializer`]: compiled blueprint plus data to [`Node`]
//! - [`RenderingPipeline`]: all of the above plus lifecycle [`Hooks`]
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use blueprint_render::{
//!     Blueprint, BlueprintPredicate, BlueprintValue, InMemoryCatalog, RenderingPipeline,
//! };
//! use serde_json::json;
//!
//! let catalog = InMemoryCatalog::new().with(
//!     "users",
//!     Blueprint::element("ul")
//!         .child(Blueprint::repeat(
//!             BlueprintValue::path("users"),
//!             "user",
//!             vec![Blueprint::element("li")
//!                 .attribute("class", BlueprintValue::path("user.role"))
//!                 .child(Blueprint::text(BlueprintValue::path("user.name")))
//!                 .build()],
//!         ))
//!         .child(Blueprint::conditional(
//!             BlueprintPredicate::present(BlueprintValue::path("more")),
//!             vec![Blueprint::text("...")],
//!             vec![],
//!         ))
//!         .build(),
//! );
//!
//! let pipeline = RenderingPipeline::builder().catalog(Arc::new(catalog)).build();
//! let node = pipeline
//!     .render("users", &json!({
//!         "users": [{"name": "Ada", "role": "admin"}, {"name": "Linus"}],
//!     }))
//!     .unwrap();
//!
//! assert_eq!(
//!     node.to_markup(),
//!     r#"<ul><div><li class="admin">Ada</li><li>Linus</li></div></ul>"#
//! );
//! ```
//!
//! ## Values and Paths
//!
//! Values resolve to `Option<serde_json::Value>`, `None` being null. Paths use
//! dots and brackets (`user.name`, `rows[0].id`, `rows.0.id`). A path whose
//! first segment names a loop variable reads from that variable; any other
//! path reads from the root data. See [`resolve`] for the resolution strategies
//! and [`coerce`] for how values become text and booleans.
//!
//! ## Includes and Cycles
//!
//! An `Include` renders another catalog entry with a new root (its model) while
//! keeping outer loop variables visible. Cycles are detected both when
//! compiling (constant include targets leading back to the key, or a
//! transformer such as [`IncludeValidator`] resolving include targets) and
//! when rendering (a computed include key re-entering a key on the current
//! include chain). Include depth is bounded by
//! [`PipelineConfig::max_include_depth`].
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod accessor;
mod cache;
mod catalog;
mod config;
mod error;
mod execution;
mod hooks;
mod ir;
mod materializer;
mod pipeline;
mod request;
pub mod resolve;
mod resolver;
mod transform;

pub use blueprint_dom::{Element, Node};

pub use accessor::{
    AccessKey, Accessor, AccessorWrapper, DotPathNavigator, JsonAccessor, JsonAccessorWrapper,
    Shape, ValueNavigator,
};
pub use cache::CompiledCache;
pub use catalog::{BlueprintCatalog, InMemoryCatalog, OverlayCatalog};
pub use config::{PipelineConfig, DEFAULT_CONTAINER_TAG, DEFAULT_MAX_INCLUDE_DEPTH};
pub use error::{RenderError, Result, ShortCircuit};
pub use execution::{RenderingExecution, ResolutionGuard, ResolutionStack, Scope};
pub use hooks::{
    AfterMaterializeFn, AfterResolveFn, BeforeMaterializeFn, BeforeResolveFn, Hooks, OnFailureFn,
    RenderStage,
};
pub use ir::{Blueprint, BlueprintDirective, BlueprintPredicate, BlueprintValue, ElementBuilder};
pub use materializer::BlueprintMaterializer;
pub use pipeline::{RenderingPipeline, RenderingPipelineBuilder};
pub use request::RenderingRequest;
pub use resolve::{
    coerce, ConstantValueResolver, PathValueResolver, PredicateEvaluator, TransformTimeResolver,
    ValueResolver,
};
pub use resolver::BlueprintResolver;
pub use transform::{
    BlueprintTransformer, ConstantFolder, IncludeValidator, TransformPass, TransformerChain,
};

//! Lifecycle hooks for the rendering pipeline.
//!
//! Hooks observe a render at fixed points without changing how it runs:
//!
//! ```text
//! render(key, data)
//!   → BEFORE-RESOLVE hook ← (key, data, request, execution)
//!   → resolve
//!   → AFTER-RESOLVE hook ← (key, compiled blueprint, execution)
//!   → BEFORE-MATERIALIZE hook ← (compiled blueprint, execution)
//!   → materialize
//!   → AFTER-MATERIALIZE hook ← (node, execution)
//!   → node
//! ```
//!
//! Any failure along the way runs the ON-FAILURE hooks with the error, the
//! [`RenderStage`] it came from, and the execution. Failure hooks are
//! best-effort: errors they return are logged and dropped so the original
//! error reaches the caller.
//!
//! A hook influences control flow only by returning
//! [`RenderError::ShortCircuit`], which ends the render with the carried node:
//!
//! ```rust
//! use blueprint_render::{Hooks, Node, RenderError};
//!
//! let hooks = Hooks::new().before_resolve(|key, _data, request, _execution| {
//!     if key.starts_with("admin/") && request.attribute("role").is_none() {
//!         return Err(RenderError::short_circuit(Node::text("access denied")));
//!     }
//!     Ok(())
//! });
//! assert!(!hooks.is_empty());
//! ```

use std::fmt;
use std::sync::Arc;

use blueprint_dom::Node;
use serde_json::Value;
use tracing::warn;

use crate::error::{RenderError, Result};
use crate::execution::RenderingExecution;
use crate::ir::Blueprint;
use crate::request::RenderingRequest;

/// Where in a render something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Compiling the blueprint
    Resolve,
    /// Materializing the compiled blueprint
    Materialize,
    /// Running before-resolve hooks
    BeforeResolve,
    /// Running after-resolve hooks
    AfterResolve,
    /// Running before-materialize hooks
    BeforeMaterialize,
    /// Running after-materialize hooks
    AfterMaterialize,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStage::Resolve => write!(f, "resolve"),
            RenderStage::Materialize => write!(f, "materialize"),
            RenderStage::BeforeResolve => write!(f, "before-resolve"),
            RenderStage::AfterResolve => write!(f, "after-resolve"),
            RenderStage::BeforeMaterialize => write!(f, "before-materialize"),
            RenderStage::AfterMaterialize => write!(f, "after-materialize"),
        }
    }
}

/// Type alias for before-resolve hook functions.
pub type BeforeResolveFn =
    Arc<dyn Fn(&str, &Value, &RenderingRequest, &RenderingExecution) -> Result<()> + Send + Sync>;

/// Type alias for after-resolve hook functions.
pub type AfterResolveFn =
    Arc<dyn Fn(&str, &Blueprint, &RenderingExecution) -> Result<()> + Send + Sync>;

/// Type alias for before-materialize hook functions.
pub type BeforeMaterializeFn =
    Arc<dyn Fn(&Blueprint, &RenderingExecution) -> Result<()> + Send + Sync>;

/// Type alias for after-materialize hook functions.
pub type AfterMaterializeFn = Arc<dyn Fn(&Node, &RenderingExecution) -> Result<()> + Send + Sync>;

/// Type alias for failure hook functions.
pub type OnFailureFn =
    Arc<dyn Fn(&RenderError, RenderStage, &RenderingExecution) -> Result<()> + Send + Sync>;

/// Hooks registered on a pipeline. Each stage runs its hooks in registration
/// order and stops at the first error.
#[derive(Clone, Default)]
pub struct Hooks {
    before_resolve: Vec<BeforeResolveFn>,
    after_resolve: Vec<AfterResolveFn>,
    before_materialize: Vec<BeforeMaterializeFn>,
    after_materialize: Vec<AfterMaterializeFn>,
    on_failure: Vec<OnFailureFn>,
}

impl Hooks {
    /// Creates a new empty hooks configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.before_resolve.is_empty()
            && self.after_resolve.is_empty()
            && self.before_materialize.is_empty()
            && self.after_materialize.is_empty()
            && self.on_failure.is_empty()
    }

    /// Adds a hook that runs before the blueprint is resolved.
    pub fn before_resolve<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Value, &RenderingRequest, &RenderingExecution) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.before_resolve.push(Arc::new(f));
        self
    }

    /// Adds a hook that receives the compiled blueprint.
    pub fn after_resolve<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Blueprint, &RenderingExecution) -> Result<()> + Send + Sync + 'static,
    {
        self.after_resolve.push(Arc::new(f));
        self
    }

    /// Adds a hook that runs right before materialization.
    pub fn before_materialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&Blueprint, &RenderingExecution) -> Result<()> + Send + Sync + 'static,
    {
        self.before_materialize.push(Arc::new(f));
        self
    }

    /// Adds a hook that receives the finished node.
    pub fn after_materialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&Node, &RenderingExecution) -> Result<()> + Send + Sync + 'static,
    {
        self.after_materialize.push(Arc::new(f));
        self
    }

    /// Adds a failure hook.
    ///
    /// Failure hooks never run for short-circuits.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&RenderError, RenderStage, &RenderingExecution) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.on_failure.push(Arc::new(f));
        self
    }

    pub fn run_before_resolve(
        &self,
        key: &str,
        data: &Value,
        request: &RenderingRequest,
        execution: &RenderingExecution,
    ) -> Result<()> {
        for hook in &self.before_resolve {
            hook(key, data, request, execution)?;
        }
        Ok(())
    }

    pub fn run_after_resolve(
        &self,
        key: &str,
        blueprint: &Blueprint,
        execution: &RenderingExecution,
    ) -> Result<()> {
        for hook in &self.after_resolve {
            hook(key, blueprint, execution)?;
        }
        Ok(())
    }

    pub fn run_before_materialize(
        &self,
        blueprint: &Blueprint,
        execution: &RenderingExecution,
    ) -> Result<()> {
        for hook in &self.before_materialize {
            hook(blueprint, execution)?;
        }
        Ok(())
    }

    pub fn run_after_materialize(&self, node: &Node, execution: &RenderingExecution) -> Result<()> {
        for hook in &self.after_materialize {
            hook(node, execution)?;
        }
        Ok(())
    }

    /// Runs every failure hook. Errors they return are logged and dropped;
    /// a failing hook does not stop the ones after it.
    pub fn run_on_failure(
        &self,
        error: &RenderError,
        stage: RenderStage,
        execution: &RenderingExecution,
    ) {
        for hook in &self.on_failure {
            if let Err(hook_error) = hook(error, stage, execution) {
                warn!(
                    %stage,
                    original = %error,
                    error = %hook_error,
                    "failure hook failed"
                );
            }
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_resolve_count", &self.before_resolve.len())
            .field("after_resolve_count", &self.after_resolve.len())
            .field("before_materialize_count", &self.before_materialize.len())
            .field("after_materialize_count", &self.after_materialize.len())
            .field("on_failure_count", &self.on_failure.len())
            .finish()
    }
}

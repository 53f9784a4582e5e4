//! Per-render execution state.
//!
//! A [`RenderingExecution`] is created for every top-level render and for every
//! include. It carries:
//!
//! - the accessor wrapper and value navigator used to read data
//! - the root accessor (the render's data, or an include's model)
//! - the shared [`RenderingRequest`]
//! - a [`Scope`] of loop variables
//! - a diagnostics map for hooks and instrumentation
//! - the [`ResolutionStack`] and include trail used for cycle detection
//!
//! # Scoped Variables
//!
//! Loop bindings are persistent: [`Scope::bind`] returns a new scope and leaves
//! the old one untouched. A repeat body is rendered in a child execution built
//! by [`RenderingExecution::with_variable`], so a binding disappears as soon as
//! that child is dropped; there is nothing to pop.
//!
//! # Diagnostics
//!
//! Loop children share their parent's diagnostics map. Include executions
//! start from a copy, so an include cannot write into its parent's map.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::accessor::{
    Accessor, AccessorWrapper, DotPathNavigator, JsonAccessorWrapper, ValueNavigator,
};
use crate::error::{RenderError, Result};
use crate::request::RenderingRequest;

/// Persistent map of loop variables.
///
/// Cloning is cheap: frames are shared. Later bindings shadow earlier ones
/// with the same name.
#[derive(Clone, Default)]
pub struct Scope {
    head: Option<Arc<Frame>>,
}

struct Frame {
    name: String,
    accessor: Arc<dyn Accessor>,
    parent: Option<Arc<Frame>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new scope with `name` bound to `accessor`.
    pub fn bind(&self, name: impl Into<String>, accessor: Arc<dyn Accessor>) -> Scope {
        Scope {
            head: Some(Arc::new(Frame {
                name: name.into(),
                accessor,
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the innermost binding for `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Accessor>> {
        let mut frame = self.head.as_deref();
        while let Some(f) = frame {
            if f.name == name {
                return Some(&f.accessor);
            }
            frame = f.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Visible variable names, outermost first, shadowed names listed once.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut frame = self.head.as_deref();
        while let Some(f) = frame {
            if !names.contains(&f.name.as_str()) {
                names.push(&f.name);
            }
            frame = f.parent.as_deref();
        }
        names.reverse();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("names", &self.names())
            .finish()
    }
}

/// Keys currently being compiled along one logical call stack.
///
/// The stack is shared by an execution and every include execution nested
/// inside it, but never between separate renders, so one render's in-flight
/// key cannot block another render.
#[derive(Debug, Clone, Default)]
pub struct ResolutionStack {
    keys: Arc<Mutex<Vec<String>>>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as in progress.
    ///
    /// Fails with [`RenderError::CircularReference`] if it already is. The
    /// marker is released when the returned guard drops.
    pub fn enter(&self, key: &str) -> Result<ResolutionGuard> {
        let mut keys = self.keys.lock();
        if keys.iter().any(|k| k == key) {
            return Err(RenderError::CircularReference {
                key: key.to_string(),
                chain: keys.clone(),
            });
        }
        keys.push(key.to_string());
        Ok(ResolutionGuard {
            stack: self.clone(),
            key: key.to_string(),
        })
    }

    /// Snapshot of in-progress keys, outermost first.
    pub fn active(&self) -> Vec<String> {
        self.keys.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }
}

/// Releases a [`ResolutionStack`] marker on drop.
#[derive(Debug)]
pub struct ResolutionGuard {
    stack: ResolutionStack,
    key: String,
}

impl ResolutionGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        let mut keys = self.stack.keys.lock();
        if let Some(pos) = keys.iter().rposition(|k| *k == self.key) {
            keys.remove(pos);
        }
    }
}

/// Mutable context for one render (or one include within a render).
///
/// Never shared across threads or reused across renders.
pub struct RenderingExecution {
    wrapper: Arc<dyn AccessorWrapper>,
    navigator: Arc<dyn ValueNavigator>,
    root: Arc<dyn Accessor>,
    request: Arc<RenderingRequest>,
    scope: Scope,
    diagnostics: Arc<Mutex<IndexMap<String, Value>>>,
    resolving: ResolutionStack,
    include_trail: Vec<String>,
}

impl RenderingExecution {
    /// Creates an execution over `root`.
    pub fn new(
        wrapper: Arc<dyn AccessorWrapper>,
        navigator: Arc<dyn ValueNavigator>,
        root: Arc<dyn Accessor>,
        request: Arc<RenderingRequest>,
    ) -> Self {
        Self {
            wrapper,
            navigator,
            root,
            request,
            scope: Scope::new(),
            diagnostics: Arc::new(Mutex::new(IndexMap::new())),
            resolving: ResolutionStack::new(),
            include_trail: Vec::new(),
        }
    }

    /// Creates an execution over JSON data with the default accessor wrapper,
    /// navigator, and an empty request.
    pub fn for_data(data: Value) -> Self {
        Self::for_request(data, RenderingRequest::new())
    }

    /// Like [`for_data`](Self::for_data) with an explicit request.
    pub fn for_request(data: Value, request: RenderingRequest) -> Self {
        let wrapper: Arc<dyn AccessorWrapper> = Arc::new(JsonAccessorWrapper);
        let root = wrapper.wrap(data);
        Self::new(
            wrapper,
            Arc::new(DotPathNavigator),
            root,
            Arc::new(request),
        )
    }

    /// Wraps a raw value with this execution's accessor wrapper.
    pub fn wrap(&self, value: Value) -> Arc<dyn Accessor> {
        self.wrapper.wrap(value)
    }

    pub fn navigator(&self) -> &dyn ValueNavigator {
        self.navigator.as_ref()
    }

    pub fn root(&self) -> &dyn Accessor {
        self.root.as_ref()
    }

    pub fn request(&self) -> &RenderingRequest {
        &self.request
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Looks up a loop variable.
    pub fn variable(&self, name: &str) -> Option<&Arc<dyn Accessor>> {
        self.scope.get(name)
    }

    /// A child execution with `name` bound in scope.
    ///
    /// The child shares root, request, diagnostics and cycle-detection state.
    pub fn with_variable(&self, name: impl Into<String>, accessor: Arc<dyn Accessor>) -> Self {
        Self {
            wrapper: self.wrapper.clone(),
            navigator: self.navigator.clone(),
            root: self.root.clone(),
            request: self.request.clone(),
            scope: self.scope.bind(name, accessor),
            diagnostics: self.diagnostics.clone(),
            resolving: self.resolving.clone(),
            include_trail: self.include_trail.clone(),
        }
    }

    /// An execution for including `key` with a new root.
    ///
    /// Loop variables are kept so included blueprints still see outer loop
    /// variables; diagnostics are copied; the include trail gains `key`.
    pub fn nested(&self, key: &str, root: Arc<dyn Accessor>) -> Self {
        let diagnostics = self.diagnostics.lock().clone();
        let mut include_trail = self.include_trail.clone();
        include_trail.push(key.to_string());
        Self {
            wrapper: self.wrapper.clone(),
            navigator: self.navigator.clone(),
            root,
            request: self.request.clone(),
            scope: self.scope.clone(),
            diagnostics: Arc::new(Mutex::new(diagnostics)),
            resolving: self.resolving.clone(),
            include_trail,
        }
    }

    /// Marks the top-level key this execution renders.
    pub(crate) fn enter_include_trail(&mut self, key: &str) {
        self.include_trail.push(key.to_string());
    }

    /// Keys rendered along the current include chain, outermost first.
    pub fn include_trail(&self) -> &[String] {
        &self.include_trail
    }

    pub fn resolution_stack(&self) -> &ResolutionStack {
        &self.resolving
    }

    /// Records a diagnostic value.
    pub fn record(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.diagnostics.lock().insert(key.into(), value.into());
    }

    pub fn diagnostic(&self, key: &str) -> Option<Value> {
        self.diagnostics.lock().get(key).cloned()
    }

    /// Snapshot of all diagnostics in insertion order.
    pub fn diagnostics(&self) -> IndexMap<String, Value> {
        self.diagnostics.lock().clone()
    }
}

impl fmt::Debug for RenderingExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderingExecution")
            .field("root", &self.root)
            .field("request", &self.request)
            .field("scope", &self.scope)
            .field("include_trail", &self.include_trail)
            .finish_non_exhaustive()
    }
}

//! Read access over host data.
//!
//! The engine never inspects host objects directly. Everything goes through
//! three small contracts:
//!
//! - [`Accessor`]: a handle over one value exposing its shape, keys and members
//! - [`AccessorWrapper`]: turns a raw value into an accessor
//! - [`ValueNavigator`]: walks a path expression starting from an accessor
//!
//! Host data enters the engine once, at the pipeline boundary, as a
//! `serde_json::Value` (anything `Serialize` converts). The default
//! implementations, [`JsonAccessor`], [`JsonAccessorWrapper`] and
//! [`DotPathNavigator`], work over that tree. Alternative implementations can
//! be plugged into the pipeline builder.
//!
//! # Path Syntax
//!
//! [`DotPathNavigator`] understands:
//!
//! - Simple keys: `name`
//! - Nested objects: `user.profile.name`
//! - Array indices: `items.0` or `items[0]`, freely mixed: `rows[1].cells.2`
//!
//! A missing segment anywhere yields `None`.

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

/// The structural shape of an accessed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Keyed members in insertion order.
    Map,
    /// Indexed members `0..n`.
    List,
    /// Anything without members: strings, numbers, booleans, null.
    Scalar,
}

/// A member key: a map key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessKey {
    Name(String),
    Index(usize),
}

impl AccessKey {
    /// The key as a JSON value (string for names, number for indices).
    pub fn to_value(&self) -> Value {
        match self {
            AccessKey::Name(name) => Value::String(name.clone()),
            AccessKey::Index(i) => Value::from(*i),
        }
    }
}

impl From<&str> for AccessKey {
    fn from(s: &str) -> Self {
        AccessKey::Name(s.to_string())
    }
}

impl From<usize> for AccessKey {
    fn from(i: usize) -> Self {
        AccessKey::Index(i)
    }
}

/// Read-only handle over a single value.
pub trait Accessor: Debug + Send + Sync {
    /// The value's shape.
    fn shape(&self) -> Shape;

    /// Member keys: map keys in insertion order, or `0..n` for lists.
    /// Scalars have no keys.
    fn keys(&self) -> Vec<AccessKey>;

    /// Looks up a member.
    fn get(&self, key: &AccessKey) -> Option<Value>;

    /// The underlying raw value.
    fn raw(&self) -> Value;

    fn is_map(&self) -> bool {
        self.shape() == Shape::Map
    }

    fn is_list(&self) -> bool {
        self.shape() == Shape::List
    }

    /// Maps and lists are both iterable collections.
    fn is_collection(&self) -> bool {
        self.shape() != Shape::Scalar
    }
}

/// Produces accessors for raw values.
pub trait AccessorWrapper: Debug + Send + Sync {
    fn wrap(&self, value: Value) -> Arc<dyn Accessor>;
}

/// Resolves path expressions against an accessor.
pub trait ValueNavigator: Debug + Send + Sync {
    /// Returns the value at `path`, or `None` if any segment is missing.
    /// An empty path returns the accessor's own value.
    fn navigate(&self, accessor: &dyn Accessor, path: &str) -> Option<Value>;
}

/// [`Accessor`] over a `serde_json::Value`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonAccessor {
    value: Value,
}

impl JsonAccessor {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Borrows the wrapped value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Accessor for JsonAccessor {
    fn shape(&self) -> Shape {
        match &self.value {
            Value::Object(_) => Shape::Map,
            Value::Array(_) => Shape::List,
            _ => Shape::Scalar,
        }
    }

    fn keys(&self) -> Vec<AccessKey> {
        match &self.value {
            Value::Object(map) => map.keys().map(|k| AccessKey::Name(k.clone())).collect(),
            Value::Array(items) => (0..items.len()).map(AccessKey::Index).collect(),
            _ => Vec::new(),
        }
    }

    fn get(&self, key: &AccessKey) -> Option<Value> {
        member(&self.value, key).cloned()
    }

    fn raw(&self) -> Value {
        self.value.clone()
    }
}

/// Default [`AccessorWrapper`], producing [`JsonAccessor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAccessorWrapper;

impl AccessorWrapper for JsonAccessorWrapper {
    fn wrap(&self, value: Value) -> Arc<dyn Accessor> {
        Arc::new(JsonAccessor::new(value))
    }
}

/// Default [`ValueNavigator`] for dotted and indexed paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotPathNavigator;

impl DotPathNavigator {
    /// Splits a path into member keys.
    ///
    /// Returns `None` for malformed paths (unclosed or non-numeric brackets,
    /// empty segments).
    pub fn parse(path: &str) -> Option<Vec<AccessKey>> {
        let mut keys = Vec::new();
        for segment in path.split('.') {
            let (name, mut rest) = match segment.find('[') {
                Some(pos) => (&segment[..pos], &segment[pos..]),
                None => (segment, ""),
            };
            if name.is_empty() && rest.is_empty() {
                return None;
            }
            if !name.is_empty() {
                keys.push(AccessKey::Name(name.to_string()));
            }
            while !rest.is_empty() {
                let close = rest.find(']')?;
                let index: usize = rest[1..close].trim().parse().ok()?;
                keys.push(AccessKey::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return None;
                }
            }
        }
        Some(keys)
    }
}

impl ValueNavigator for DotPathNavigator {
    fn navigate(&self, accessor: &dyn Accessor, path: &str) -> Option<Value> {
        if path.is_empty() {
            return Some(accessor.raw());
        }
        let keys = Self::parse(path)?;
        let (first, rest) = keys.split_first()?;
        let head = accessor.get(first)?;
        let mut current = &head;
        for key in rest {
            current = member(current, key)?;
        }
        Some(current.clone())
    }
}

/// Member lookup shared by accessor and navigator.
///
/// Names address lists when they parse as an index, and indices address
/// objects by their decimal string, so `items.0` and `items[0]` agree.
fn member<'a>(value: &'a Value, key: &AccessKey) -> Option<&'a Value> {
    match (value, key) {
        (Value::Object(map), AccessKey::Name(name)) => map.get(name),
        (Value::Object(map), AccessKey::Index(i)) => map.get(&i.to_string()),
        (Value::Array(items), AccessKey::Index(i)) => items.get(*i),
        (Value::Array(items), AccessKey::Name(name)) => {
            let index: usize = name.parse().ok()?;
            items.get(index)
        }
        _ => None,
    }
}

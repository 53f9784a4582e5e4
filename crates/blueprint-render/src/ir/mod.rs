//! Blueprint intermediate representation.
//!
//! Three closed sum types describe a template without any authoring syntax:
//!
//! - [`Blueprint`]: the markup tree (element, text, conditional, repeat, include)
//! - [`BlueprintValue`]: how to obtain a runtime value
//! - [`BlueprintPredicate`]: boolean expressions over values
//!
//! [`BlueprintDirective`]s ride along on elements. All types are immutable
//! data: transformers build new trees instead of editing old ones, and compiled
//! trees are shared as `Arc<Blueprint>`.
//!
//! Every type derives `serde` support using an internal `kind` tag, so
//! fixtures can be written as JSON or YAML documents and compiled output can
//! be dumped for inspection.

mod blueprint;
mod predicate;
mod value;

pub use blueprint::{Blueprint, BlueprintDirective, ElementBuilder};
pub use predicate::BlueprintPredicate;
pub use value::BlueprintValue;
